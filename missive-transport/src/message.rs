//! Transport-level message representation.
//!
//! A [`MimeMessage`] is a flat, ordered list of header fields plus a body,
//! with the envelope (sender and recipients) tracked alongside. Structural
//! setters such as [`MimeMessage::set_subject`] are thin wrappers around
//! [`MimeMessage::set_header`], so a later `set_header` for the same field
//! replaces whatever a structural setter wrote.

use std::fmt::{self, Display};

use chrono::{DateTime, FixedOffset, Utc};
use missive_common::Address;

const FROM: &str = "From";
const REPLY_TO: &str = "Reply-To";
const SUBJECT: &str = "Subject";
const DATE: &str = "Date";
const CONTENT_TYPE: &str = "Content-Type";
const MIME_VERSION: &str = "MIME-Version";
const MESSAGE_ID: &str = "Message-ID";

/// Recipient classes. Bcc recipients only exist on the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientType {
    To,
    Cc,
    Bcc,
}

impl RecipientType {
    /// The header field this class is rendered into, if any.
    #[must_use]
    pub const fn header_name(self) -> Option<&'static str> {
        match self {
            Self::To => Some("To"),
            Self::Cc => Some("Cc"),
            Self::Bcc => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeMessage {
    headers: Vec<(String, String)>,
    sender: Option<Address>,
    recipients: Vec<(RecipientType, Address)>,
    reply_to: Vec<Address>,
    body: String,
    finalized: bool,
}

impl MimeMessage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_from(&mut self, address: &Address) {
        self.sender = Some(address.clone());
        self.set_header(FROM, address.to_string());
    }

    #[must_use]
    pub fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    pub fn add_recipient(&mut self, kind: RecipientType, address: &Address) {
        self.recipients.push((kind, address.clone()));
        if let Some(name) = kind.header_name() {
            self.append_address(name, address);
        }
    }

    pub fn add_recipients<'a>(
        &mut self,
        kind: RecipientType,
        addresses: impl IntoIterator<Item = &'a Address>,
    ) {
        for address in addresses {
            self.add_recipient(kind, address);
        }
    }

    pub fn recipients(&self, kind: RecipientType) -> impl Iterator<Item = &Address> {
        self.recipients
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, address)| address)
    }

    /// Every envelope recipient, in the order they were added.
    pub fn all_recipients(&self) -> impl Iterator<Item = &Address> {
        self.recipients.iter().map(|(_, address)| address)
    }

    pub fn add_reply_to(&mut self, address: &Address) {
        self.reply_to.push(address.clone());
        self.append_address(REPLY_TO, address);
    }

    #[must_use]
    pub fn reply_to(&self) -> &[Address] {
        &self.reply_to
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.set_header(SUBJECT, subject);
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.header(SUBJECT)
    }

    /// Sets the body and its `Content-Type`.
    ///
    /// For `text/*` types the charset is appended as a parameter unless the
    /// MIME type already carries one.
    pub fn set_body(&mut self, content: impl Into<String>, mime_type: &str, charset: Option<&str>) {
        self.body = content.into();

        let content_type = match charset {
            Some(charset)
                if mime_type
                    .get(..5)
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("text/"))
                    && !mime_type.to_ascii_lowercase().contains("charset=") =>
            {
                format!("{mime_type}; charset={charset}")
            }
            _ => mime_type.to_string(),
        };

        self.set_header(CONTENT_TYPE, content_type);
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    pub fn set_sent_date(&mut self, date: DateTime<Utc>) {
        self.set_header(DATE, date.to_rfc2822());
    }

    /// The `Date` header, if present and well formed.
    #[must_use]
    pub fn sent_date(&self) -> Option<DateTime<FixedOffset>> {
        self.header(DATE)
            .and_then(|date| DateTime::parse_from_rfc2822(date).ok())
    }

    /// Sets a header field, replacing any existing field with the same name
    /// (compared case-insensitively).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.finalized = false;

        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name, value)),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.header(MESSAGE_ID)
    }

    /// Fills in the fields every message must carry and marks the message
    /// ready for transport. Fields that are already present are left alone.
    pub fn save_changes(&mut self, host: Option<&str>) {
        if self.header(MIME_VERSION).is_none() {
            self.set_header(MIME_VERSION, "1.0");
        }

        if self.header(CONTENT_TYPE).is_none() {
            self.set_header(CONTENT_TYPE, "text/plain");
        }

        if self.header(DATE).is_none() {
            self.set_sent_date(Utc::now());
        }

        if self.header(MESSAGE_ID).is_none() {
            let id = uuid::Uuid::new_v4().simple();
            let host = host.unwrap_or("localhost");
            self.set_header(MESSAGE_ID, format!("<{id}@{host}>"));
        }

        self.finalized = true;
    }

    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Renders the message as RFC 5322 text with CRLF line endings.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        self.to_string()
    }

    fn append_address(&mut self, name: &str, address: &Address) {
        let value = match self.header(name) {
            Some(existing) => format!("{existing}, {address}"),
            None => address.to_string(),
        };
        self.set_header(name, value);
    }
}

impl Display for MimeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: ")?;
            let value = value.replace('\r', "");
            for (i, line) in value.split('\n').enumerate() {
                if i > 0 {
                    f.write_str("\r\n ")?;
                }
                f.write_str(line)?;
            }
            f.write_str("\r\n")?;
        }

        f.write_str("\r\n")?;

        if !self.body.is_empty() {
            for line in self.body.lines() {
                f.write_str(line)?;
                f.write_str("\r\n")?;
            }
        }

        Ok(())
    }
}

/// Comma separated header names, in order. Used for logging.
pub(crate) fn header_summary(message: &MimeMessage) -> String {
    message
        .headers()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn addr(email: &str) -> Address {
        Address::new(email).unwrap()
    }

    #[test]
    fn test_set_header_overwrites_case_insensitively() {
        let mut message = MimeMessage::new();
        message.set_subject("Initial Subject");
        message.set_header("subject", "Overridden Subject");

        assert_eq!(message.subject(), Some("Overridden Subject"));
        assert_eq!(message.headers().count(), 1);
    }

    #[test]
    fn test_recipients_accumulate_in_headers() {
        let mut message = MimeMessage::new();
        message.add_recipient(RecipientType::To, &addr("a@example.com"));
        message.add_recipient(RecipientType::To, &addr("b@example.com"));
        message.add_recipient(RecipientType::Cc, &addr("c@example.com"));
        message.add_recipient(RecipientType::Bcc, &addr("d@example.com"));

        assert_eq!(message.header("To"), Some("a@example.com, b@example.com"));
        assert_eq!(message.header("Cc"), Some("c@example.com"));
        assert_eq!(message.header("Bcc"), None);
        assert_eq!(message.recipients(RecipientType::Bcc).count(), 1);
        assert_eq!(message.all_recipients().count(), 4);
    }

    #[test]
    fn test_body_charset_parameter() {
        let mut message = MimeMessage::new();
        message.set_body("hello", "text/plain", Some("UTF-8"));
        assert_eq!(message.content_type(), Some("text/plain; charset=UTF-8"));

        message.set_body("hello", "text/html; charset=ISO-8859-1", Some("UTF-8"));
        assert_eq!(
            message.content_type(),
            Some("text/html; charset=ISO-8859-1")
        );

        message.set_body("{}", "application/json", Some("UTF-8"));
        assert_eq!(message.content_type(), Some("application/json"));

        message.set_body("hello", "text/plain", None);
        assert_eq!(message.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_save_changes_fills_required_fields() {
        let mut message = MimeMessage::new();
        assert!(!message.is_finalized());

        message.save_changes(Some("testhost.local"));

        assert!(message.is_finalized());
        assert_eq!(message.header("MIME-Version"), Some("1.0"));
        assert_eq!(message.content_type(), Some("text/plain"));
        assert!(message.sent_date().is_some());
        let id = message.message_id().unwrap();
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@testhost.local>"));
    }

    #[test]
    fn test_save_changes_keeps_existing_fields() {
        let mut message = MimeMessage::new();
        message.set_header("Message-ID", "<fixed@example.com>");
        message.save_changes(None);

        assert_eq!(message.message_id(), Some("<fixed@example.com>"));
    }

    #[test]
    fn test_mutation_clears_finalized() {
        let mut message = MimeMessage::new();
        message.save_changes(None);
        message.set_subject("changed");
        assert!(!message.is_finalized());
    }

    #[test]
    fn test_render() {
        let mut message = MimeMessage::new();
        message.set_from(&addr("a@b.com"));
        message.add_recipient(RecipientType::To, &addr("c@d.com"));
        message.add_recipient(RecipientType::Bcc, &addr("hidden@d.com"));
        message.set_subject("S");
        message.set_header("X-Multi", "first\r\nsecond");
        message.set_body("line one\nline two\n", "text/plain", None);

        assert_eq!(
            message.to_rfc5322(),
            "From: a@b.com\r\n\
             To: c@d.com\r\n\
             Subject: S\r\n\
             X-Multi: first\r\n second\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             line one\r\n\
             line two\r\n"
        );
    }

    #[test]
    fn test_header_summary() {
        let mut message = MimeMessage::new();
        message.set_subject("S");
        message.set_header("X-Test", "1");
        assert_eq!(header_summary(&message), "Subject,X-Test");
    }
}
