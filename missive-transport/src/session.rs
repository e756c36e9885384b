use std::{sync::Arc, time::Duration};

use missive_common::{
    Address, Credentials, SocketTimeouts, TlsPolicy, config::DEFAULT_SMTP_PORT,
};

/// Everything a transport needs to open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: Option<String>,
    pub port: u16,
    pub timeouts: SocketTimeouts,
    pub tls: TlsPolicy,
    pub credentials: Option<Credentials>,
    /// Envelope sender override, used for bounces.
    pub bounce_address: Option<Address>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_SMTP_PORT,
            timeouts: SocketTimeouts::default(),
            tls: TlsPolicy::default(),
            credentials: None,
            bounce_address: None,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }
}

/// An immutable, cheaply clonable transport session.
///
/// A session does not hold a connection; it is the resolved configuration
/// a [`Transport`](crate::Transport) connects with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    config: Arc<SessionConfig>,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.config.host.as_deref()
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.config.port
    }

    #[must_use]
    pub fn tls(&self) -> TlsPolicy {
        self.config.tls
    }

    #[must_use]
    pub fn timeouts(&self) -> SocketTimeouts {
        self.config.timeouts
    }

    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.config.timeouts.connect_timeout()
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.config.credentials.as_ref()
    }

    #[must_use]
    pub fn bounce_address(&self) -> Option<&Address> {
        self.config.bounce_address.as_ref()
    }
}

impl From<SessionConfig> for Session {
    fn from(config: SessionConfig) -> Self {
        Self::new(config)
    }
}
