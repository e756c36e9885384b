pub mod address;
pub mod config;
pub mod logging;

pub use address::{Address, AddressError};
pub use config::{ConfigError, Credentials, MailerConfig, SocketTimeouts, TlsPolicy};
pub use tracing;
