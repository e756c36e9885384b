//! Build email messages once, then hand them to a transport.
//!
//! [`Email`] collects addressing, headers, content and transport settings
//! and turns them into a [`MimeMessage`] exactly once. The message model and
//! the [`Transport`] seam live in `missive-transport`; addresses,
//! configuration and logging live in `missive-common`.

mod draft;
mod email;
mod error;

pub use draft::{Draft, MessageFile};
pub use email::Email;
pub use error::{EmailError, Result};
pub use missive_common::{
    Address, AddressError, ConfigError, Credentials, MailerConfig, SocketTimeouts, TlsPolicy,
    config::{DEFAULT_SMTP_PORT, DEFAULT_SSL_SMTP_PORT, SOCKET_TIMEOUT_MS},
};
pub use missive_transport::{
    MemoryTransport, MimeMessage, RecipientType, SentMessage, Session, SessionConfig, Transport,
    TransportError,
};
