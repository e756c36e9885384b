//! Socket timeout configuration handed to the transport provider.
//!
//! Neither value is enforced by the builder; they travel with the session so
//! that whatever opens the connection can apply them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Read and connect timeouts for an SMTP session, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketTimeouts {
    /// Timeout for blocking socket reads.
    ///
    /// Default: 60000 ms
    #[serde(default = "defaults::socket_timeout_ms")]
    pub read_ms: u64,

    /// Timeout for establishing the TCP connection.
    ///
    /// Default: 60000 ms
    #[serde(default = "defaults::socket_timeout_ms")]
    pub connect_ms: u64,
}

impl SocketTimeouts {
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}

impl Default for SocketTimeouts {
    fn default() -> Self {
        Self {
            read_ms: defaults::socket_timeout_ms(),
            connect_ms: defaults::socket_timeout_ms(),
        }
    }
}

pub(crate) mod defaults {
    pub const SOCKET_TIMEOUT_MS: u64 = 60_000;

    pub const fn socket_timeout_ms() -> u64 {
        SOCKET_TIMEOUT_MS
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_timeouts_defaults() {
        let timeouts = SocketTimeouts::default();
        assert_eq!(timeouts.read_ms, 60_000);
        assert_eq!(timeouts.connect_ms, 60_000);
        assert_eq!(timeouts.connect_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_override() {
        let timeouts: SocketTimeouts = toml::from_str("connect_ms = 5000").unwrap();
        assert_eq!(timeouts.connect_ms, 5000);
        assert_eq!(timeouts.read_ms, 60_000);
    }
}
