//! Mailbox address value type.
//!
//! Validation here is deliberately shallow: an address must be a single
//! `local@domain` pair without whitespace or control characters. Anything
//! stricter is left to the transport provider.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while validating or parsing an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,

    #[error("Address {0:?} is missing an '@'")]
    MissingAtSign(String),

    #[error("Address {0:?} has an empty local part")]
    EmptyLocalPart(String),

    #[error("Address {0:?} has an empty domain")]
    EmptyDomain(String),

    #[error("Address {address:?} contains invalid character {character:?}")]
    InvalidCharacter { address: String, character: char },

    #[error("Expected a single mailbox, found {0:?}")]
    NotSingle(String),

    #[error("Unable to parse address: {0}")]
    Parse(String),
}

/// A single mailbox: an email address with an optional display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Address {
    /// Validates `email` and wraps it without a display name.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] if the address is empty or malformed.
    pub fn new(email: impl AsRef<str>) -> Result<Self, AddressError> {
        Ok(Self {
            email: validate(email.as_ref())?,
            name: None,
        })
    }

    /// Validates `email` and attaches a display name.
    ///
    /// A blank display name is treated as no display name at all.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] if the address is empty or malformed.
    pub fn with_name(email: impl AsRef<str>, name: impl Into<String>) -> Result<Self, AddressError> {
        let name = name.into();
        let name = if name.trim().is_empty() {
            None
        } else {
            Some(name.trim().to_string())
        };

        Ok(Self {
            email: validate(email.as_ref())?,
            name,
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn local_part(&self) -> &str {
        self.email
            .rsplit_once('@')
            .map_or(self.email.as_str(), |(local, _)| local)
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        self.email
            .rsplit_once('@')
            .map_or("", |(_, domain)| domain)
    }
}

fn validate(raw: &str) -> Result<String, AddressError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(AddressError::Empty);
    }

    if let Some(character) = email
        .chars()
        .find(|c| c.is_whitespace() || c.is_control())
    {
        return Err(AddressError::InvalidCharacter {
            address: email.to_string(),
            character,
        });
    }

    let Some((local, domain)) = email.rsplit_once('@') else {
        return Err(AddressError::MissingAtSign(email.to_string()));
    };

    if local.is_empty() {
        return Err(AddressError::EmptyLocalPart(email.to_string()));
    }

    if domain.is_empty() {
        return Err(AddressError::EmptyDomain(email.to_string()));
    }

    Ok(email.to_string())
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts both bare addresses and `Display Name <local@domain>` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(AddressError::Empty);
        }

        let info = mailparse::addrparse(s)
            .map_err(|e| AddressError::Parse(e.to_string()))?
            .extract_single_info()
            .ok_or_else(|| AddressError::NotSingle(s.to_string()))?;

        match info.display_name {
            Some(name) => Self::with_name(&info.addr, name),
            None => Self::new(&info.addr),
        }
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => {
                f.write_str("\"")?;
                for c in name.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "\" <{}>", self.email)
            }
            None => f.write_str(&self.email),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_address() {
        let address = Address::new("alice@example.com").unwrap();
        assert_eq!(address.email(), "alice@example.com");
        assert_eq!(address.name(), None);
        assert_eq!(address.local_part(), "alice");
        assert_eq!(address.domain(), "example.com");
        assert_eq!(address.to_string(), "alice@example.com");
    }

    #[test]
    fn test_named_address() {
        let address = Address::with_name("replyto@mail.net", "Reply User").unwrap();
        assert_eq!(address.email(), "replyto@mail.net");
        assert_eq!(address.name(), Some("Reply User"));
        assert_eq!(address.to_string(), "\"Reply User\" <replyto@mail.net>");
    }

    #[test]
    fn test_blank_name_is_dropped() {
        let address = Address::with_name("bob@work.org", "   ").unwrap();
        assert_eq!(address.name(), None);
    }

    #[test]
    fn test_display_escapes_quotes() {
        let address = Address::with_name("a@b.com", r#"The "Boss""#).unwrap();
        assert_eq!(address.to_string(), r#""The \"Boss\"" <a@b.com>"#);
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Address::new(""), Err(AddressError::Empty));
        assert_eq!(Address::new("   "), Err(AddressError::Empty));
        assert!(matches!(
            Address::new("no-at-sign"),
            Err(AddressError::MissingAtSign(_))
        ));
        assert!(matches!(
            Address::new("@example.com"),
            Err(AddressError::EmptyLocalPart(_))
        ));
        assert!(matches!(
            Address::new("user@"),
            Err(AddressError::EmptyDomain(_))
        ));
        assert!(matches!(
            Address::new("us er@example.com"),
            Err(AddressError::InvalidCharacter { character: ' ', .. })
        ));
    }

    #[test]
    fn test_parse_display_form() {
        let address: Address = "Reply User <replyto@mail.net>".parse().unwrap();
        assert_eq!(address.email(), "replyto@mail.net");
        assert_eq!(address.name(), Some("Reply User"));

        let address: Address = "user123456789@longdomainnameexample.co.uk".parse().unwrap();
        assert_eq!(address.name(), None);
        assert_eq!(address.domain(), "longdomainnameexample.co.uk");
    }

    #[test]
    fn test_parse_rejects_lists() {
        let result = "a@b.com, c@d.com".parse::<Address>();
        assert!(matches!(result, Err(AddressError::NotSingle(_))));

        assert_eq!("".parse::<Address>(), Err(AddressError::Empty));
    }
}
