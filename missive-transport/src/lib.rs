//! The transport provider behind `missive`.
//!
//! This crate owns the message representation ([`MimeMessage`]), the session
//! configuration a transport connects with ([`Session`]), and the
//! [`Transport`] seam used to hand a finished message off for delivery. The
//! message builder only ever talks to these types.

mod error;
mod message;
mod session;
mod transport;

pub use error::{Result, TransportError};
pub use message::{MimeMessage, RecipientType};
pub use session::{Session, SessionConfig};
pub use transport::{MemoryTransport, SentMessage, Transport};
