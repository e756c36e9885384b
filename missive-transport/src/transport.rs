use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use missive_common::{Address, outgoing};

use crate::{MimeMessage, Result, Session, TransportError, message::header_summary};

/// Hands a finished message to whatever delivers it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submits `message` using the connection settings in `session`.
    ///
    /// # Errors
    ///
    /// Implementations fail if the message is not finalized, has no envelope,
    /// or cannot be submitted.
    async fn send(&self, session: &Session, message: &MimeMessage) -> Result<()>;
}

/// A message as recorded by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub host: String,
    pub port: u16,
    pub envelope_from: Address,
    pub recipients: Vec<Address>,
    pub message_id: Option<String>,
    pub data: String,
}

/// In-memory transport.
///
/// Applies the same envelope checks a real submission would, then records the
/// rendered message instead of sending it. Primarily intended for testing.
///
/// # Concurrency
/// Uses an `RwLock`; clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<RwLock<Vec<SentMessage>>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages recorded so far.
    ///
    /// Recovers gracefully if the lock is poisoned by accessing the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sent
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of every recorded message, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Internal`] if the lock is poisoned.
    pub fn messages(&self) -> Result<Vec<SentMessage>> {
        Ok(self.sent.read()?.clone())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, session: &Session, message: &MimeMessage) -> Result<()> {
        if !message.is_finalized() {
            return Err(TransportError::NotFinalized);
        }

        let host = session.host().ok_or(TransportError::MissingHost)?;

        let envelope_from = session
            .bounce_address()
            .or_else(|| message.sender())
            .cloned()
            .ok_or(TransportError::NoSender)?;

        let recipients: Vec<Address> = message.all_recipients().cloned().collect();
        if recipients.is_empty() {
            return Err(TransportError::NoRecipients);
        }

        outgoing!(
            level = DEBUG,
            host = host,
            port = session.port(),
            from = %envelope_from,
            recipients = recipients.len(),
            headers = %header_summary(message),
            "Recording message"
        );

        self.sent.write()?.push(SentMessage {
            host: host.to_string(),
            port: session.port(),
            envelope_from,
            recipients,
            message_id: message.message_id().map(ToString::to_string),
            data: message.to_rfc5322(),
        });

        Ok(())
    }
}
