//! TLS policy for mail submission.

use serde::{Deserialize, Serialize};

/// How the transport should secure the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Plaintext only.
    #[default]
    Disabled,

    /// Upgrade with STARTTLS when the server advertises it.
    Opportunistic,

    /// Require STARTTLS, fail the submission otherwise.
    Required,

    /// TLS from the first byte (SMTPS). Uses the SSL port instead of the
    /// plain SMTP port.
    Implicit,
}

impl TlsPolicy {
    /// Returns `true` if the connection is wrapped in TLS before any SMTP
    /// traffic is exchanged.
    #[must_use]
    pub const fn is_implicit(self) -> bool {
        matches!(self, Self::Implicit)
    }

    /// Returns `true` if STARTTLS should be attempted.
    #[must_use]
    pub const fn uses_starttls(self) -> bool {
        matches!(self, Self::Opportunistic | Self::Required)
    }
}
