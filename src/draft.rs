//! Declarative message descriptions.
//!
//! A [`MessageFile`] pairs a [`MailerConfig`] with a [`Draft`] so a whole
//! message can be described in one TOML document:
//!
//! ```toml
//! [mailer]
//! host_name = "testhost.local"
//! smtp_port = 2525
//!
//! [message]
//! from = "Sender <sender@demo.com>"
//! to = ["receiver@demo.com"]
//! subject = "Hello"
//! content = "This is a test email."
//!
//! [message.headers]
//! X-Mailer = "missive"
//! ```

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use missive_common::{ConfigError, MailerConfig};
use serde::{Deserialize, Serialize};

use crate::{Email, Result};

/// The message half of a [`MessageFile`]. Every field is optional; missing
/// required fields surface when the resulting [`Email`] is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    /// Default: `text/plain`
    pub content_type: Option<String>,
    pub headers: HashMap<String, String>,
    pub sent_date: Option<DateTime<Utc>>,
}

impl Draft {
    /// Creates an [`Email`] from `config` and fills it from this draft.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid address, header or charset.
    pub fn into_email(self, config: &MailerConfig) -> Result<Email> {
        let mut email = Email::from_config(config)?;

        if let Some(from) = &self.from {
            email.set_from(from)?;
        }

        email
            .add_to_all(&self.to)?
            .add_cc_all(&self.cc)?
            .add_bcc_all(&self.bcc)?
            .add_reply_to_all(&self.reply_to)?
            .set_headers(self.headers)?
            .set_sent_date(self.sent_date);

        if let Some(subject) = self.subject {
            email.set_subject(subject);
        }

        if let Some(content) = self.content {
            let content_type = self
                .content_type
                .unwrap_or_else(|| "text/plain".to_string());
            email.set_content(content, content_type);
        }

        Ok(email)
    }
}

/// A complete message description: transport settings plus message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFile {
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default)]
    pub message: Draft,
}

impl MessageFile {
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid.
    pub fn from_toml(document: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&document)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::EmailError;

    const DOCUMENT: &str = r#"
        [mailer]
        host_name = "testhost.local"
        smtp_port = 2525
        charset = "UTF-8"

        [message]
        from = "Sender <sender@demo.com>"
        to = ["receiver@demo.com", "second@demo.com"]
        bcc = ["audit@demo.com"]
        subject = "Hello"
        content = "This is a test email."
        sent_date = "2025-04-15T00:00:00Z"

        [message.headers]
        X-Mailer = "missive"
    "#;

    #[test]
    fn test_parse_message_file() {
        let file = MessageFile::from_toml(DOCUMENT).unwrap();

        assert_eq!(file.mailer.smtp_port, 2525);
        assert_eq!(file.message.to.len(), 2);
        assert_eq!(file.message.headers["X-Mailer"], "missive");
        assert!(file.message.sent_date.is_some());
    }

    #[test]
    fn test_draft_into_email() {
        let file = MessageFile::from_toml(DOCUMENT).unwrap();
        let mut email = file.message.into_email(&file.mailer).unwrap();

        assert_eq!(email.from_address().and_then(|a| a.name()), Some("Sender"));
        assert_eq!(email.to_addresses().len(), 2);
        assert_eq!(email.bcc_addresses().len(), 1);
        assert_eq!(email.content_type(), Some("text/plain"));

        let message = email.build().unwrap();
        assert_eq!(message.header("X-Mailer"), Some("missive"));
        assert_eq!(message.content_type(), Some("text/plain; charset=UTF-8"));
    }

    #[test]
    fn test_draft_with_bad_address() {
        let draft = Draft {
            to: vec!["fine@demo.com".to_string(), "not an address".to_string()],
            ..Draft::default()
        };

        let result = draft.into_email(&MailerConfig::default());
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[test]
    fn test_empty_draft_fails_on_build() {
        let mut email = Draft::default()
            .into_email(&MailerConfig::default())
            .unwrap();

        assert!(matches!(email.build(), Err(EmailError::MissingSender)));
    }
}
