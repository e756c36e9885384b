//! Error types for building and sending messages.

use missive_common::AddressError;
use missive_transport::TransportError;
use thiserror::Error;

/// Errors that can occur while configuring, building or sending an
/// [`Email`](crate::Email).
#[derive(Debug, Error)]
pub enum EmailError {
    /// A precondition on an argument failed (empty header name, port 0, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An address could not be validated.
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The charset label is not one we recognise.
    #[error("Unsupported charset: {0}")]
    InvalidCharset(String),

    /// `build` was called without a From address.
    #[error("From address required")]
    MissingSender,

    /// `build` was called with no To, Cc or Bcc recipients.
    #[error("At least one receiver address required")]
    MissingRecipient,

    /// Neither the builder nor its session name a host.
    #[error("Cannot find valid hostname for mail session")]
    MissingHost,

    /// `build` was called a second time on the same builder.
    #[error("The message is already built.")]
    AlreadyBuilt,

    /// A built message was required but `build` has not succeeded yet.
    #[error("The message has not been built yet")]
    NotBuilt,

    /// A session setting was changed after the session was created.
    #[error("The mail session is already initialized")]
    SessionAlreadyInitialized,

    /// The transport refused the message.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl EmailError {
    /// Returns `true` for errors that indicate misuse of the builder rather
    /// than bad input. Retrying the same call will never succeed.
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyBuilt | Self::NotBuilt | Self::SessionAlreadyInitialized
        )
    }
}

/// Specialized `Result` type for builder operations.
pub type Result<T> = std::result::Result<T, EmailError>;
