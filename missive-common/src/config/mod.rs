//! Mailer configuration.
//!
//! [`MailerConfig`] carries everything a message builder needs to derive a
//! transport session: host, ports, TLS policy, timeouts, credentials and the
//! bounce address. It can be built in code or loaded from TOML.
//!
//! ```toml
//! host_name = "smtp.example.com"
//! smtp_port = 587
//! tls = "required"
//! charset = "UTF-8"
//!
//! [timeouts]
//! connect_ms = 10000
//!
//! [credentials]
//! username = "mailer"
//! password = "hunter2"
//! ```

pub mod timeouts;
pub mod tls;

use std::{fmt, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use timeouts::SocketTimeouts;
pub use tls::TlsPolicy;

/// Default plain SMTP port.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Default SMTPS port, used with [`TlsPolicy::Implicit`].
pub const DEFAULT_SSL_SMTP_PORT: u16 = 465;

/// Default socket read and connect timeout in milliseconds.
pub const SOCKET_TIMEOUT_MS: u64 = timeouts::defaults::SOCKET_TIMEOUT_MS;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// SMTP authentication credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Transport settings used to seed a message builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailerConfig {
    #[serde(default)]
    pub host_name: Option<String>,

    /// Default: 25
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Default: 465
    #[serde(default = "defaults::ssl_smtp_port")]
    pub ssl_smtp_port: u16,

    #[serde(default)]
    pub tls: TlsPolicy,

    #[serde(default)]
    pub timeouts: SocketTimeouts,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Envelope sender used for bounces instead of the From address.
    #[serde(default)]
    pub bounce_address: Option<String>,

    #[serde(default)]
    pub charset: Option<String>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host_name: None,
            smtp_port: defaults::smtp_port(),
            ssl_smtp_port: defaults::ssl_smtp_port(),
            tls: TlsPolicy::default(),
            timeouts: SocketTimeouts::default(),
            credentials: None,
            bounce_address: None,
            charset: None,
        }
    }
}

impl MailerConfig {
    /// Parses a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&document)
    }

    /// The port a session should connect to under the configured TLS policy.
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        if self.tls.is_implicit() {
            self.ssl_smtp_port
        } else {
            self.smtp_port
        }
    }
}

mod defaults {
    pub const fn smtp_port() -> u16 {
        super::DEFAULT_SMTP_PORT
    }

    pub const fn ssl_smtp_port() -> u16 {
        super::DEFAULT_SSL_SMTP_PORT
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_mailer_config_defaults() {
        let config = MailerConfig::default();
        assert_eq!(config.host_name, None);
        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.ssl_smtp_port, 465);
        assert_eq!(config.tls, TlsPolicy::Disabled);
        assert_eq!(config.timeouts, SocketTimeouts::default());
        assert_eq!(config.effective_port(), 25);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = MailerConfig::from_toml("").unwrap();
        assert_eq!(config, MailerConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = MailerConfig::from_toml(
            r#"
            host_name = "smtp.example.com"
            smtp_port = 587
            tls = "required"
            bounce_address = "bounces@example.com"
            charset = "UTF-8"

            [timeouts]
            connect_ms = 10000

            [credentials]
            username = "mailer"
            password = "hunter2"
            "#,
        )
        .unwrap();

        assert_eq!(config.host_name.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.ssl_smtp_port, 465);
        assert_eq!(config.tls, TlsPolicy::Required);
        assert_eq!(config.timeouts.connect_ms, 10_000);
        assert_eq!(config.timeouts.read_ms, 60_000);
        assert_eq!(
            config.credentials,
            Some(Credentials::new("mailer", "hunter2"))
        );
        assert_eq!(config.effective_port(), 587);
    }

    #[test]
    fn test_implicit_tls_uses_ssl_port() {
        let config = MailerConfig {
            tls: TlsPolicy::Implicit,
            ..MailerConfig::default()
        };
        assert_eq!(config.effective_port(), 465);
    }

    #[test]
    fn test_invalid_document() {
        let err = MailerConfig::from_toml("smtp_port = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("mailer", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("mailer"));
        assert!(!debug.contains("hunter2"));
    }
}
