//! Error types for transport operations.

use thiserror::Error;

/// Errors raised by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The message was handed over before `save_changes` was called.
    #[error("Message has not been finalized")]
    NotFinalized,

    /// The message has no envelope recipients.
    #[error("Message has no recipients")]
    NoRecipients,

    /// The message has no envelope sender.
    #[error("Message has no sender")]
    NoSender,

    /// The session does not name a host to connect to.
    #[error("Session has no host configured")]
    MissingHost,

    /// Internal error (lock poisoning, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl<T> From<std::sync::PoisonError<T>> for TransportError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Specialized `Result` type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
