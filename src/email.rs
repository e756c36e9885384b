//! The message builder.

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use missive_common::{
    Address, Credentials, MailerConfig, SocketTimeouts, TlsPolicy,
    config::{DEFAULT_SMTP_PORT, DEFAULT_SSL_SMTP_PORT},
    internal, outgoing,
};
use missive_transport::{MimeMessage, RecipientType, Session, SessionConfig, Transport};

use crate::error::{EmailError, Result};

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Default)]
enum BuildState {
    #[default]
    Unbuilt,
    Built(MimeMessage),
}

impl BuildState {
    const fn message(&self) -> Option<&MimeMessage> {
        match self {
            Self::Unbuilt => None,
            Self::Built(message) => Some(message),
        }
    }
}

/// Accumulates addressing, headers, content and transport settings, then
/// produces a [`MimeMessage`] exactly once.
///
/// Every mutator takes `&mut self`, so a builder has a single owner. It is
/// not meant to be shared between threads without external locking.
///
/// The transport session is derived lazily from the host, port, TLS,
/// timeout and credential settings the first time it is needed, and cached.
/// From then on those settings are frozen: changing them fails with
/// [`EmailError::SessionAlreadyInitialized`].
///
/// # Examples
///
/// ```
/// use missive::Email;
///
/// # fn main() -> missive::Result<()> {
/// let mut email = Email::new();
/// email
///     .set_host_name("testhost.local")?
///     .set_smtp_port(2525)?
///     .set_from("sender@demo.com")?
///     .add_to("receiver@demo.com")?
///     .set_subject("Hello")
///     .set_content("This is a test email.", "text/plain");
///
/// let message = email.build()?;
/// assert_eq!(message.subject(), Some("Hello"));
///
/// // A builder only ever produces one message.
/// assert!(email.build().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Email {
    from: Option<Address>,
    to: Vec<Address>,
    cc: Vec<Address>,
    bcc: Vec<Address>,
    reply_to: Vec<Address>,
    headers: HashMap<String, String>,
    subject: Option<String>,
    charset: Option<String>,
    content: Option<String>,
    content_type: Option<String>,
    host_name: Option<String>,
    smtp_port: u16,
    ssl_smtp_port: u16,
    tls: TlsPolicy,
    timeouts: SocketTimeouts,
    credentials: Option<Credentials>,
    bounce_address: Option<Address>,
    session: Option<Session>,
    sent_date: Option<DateTime<Utc>>,
    state: BuildState,
}

impl Default for Email {
    fn default() -> Self {
        Self {
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            headers: HashMap::new(),
            subject: None,
            charset: None,
            content: None,
            content_type: None,
            host_name: None,
            smtp_port: DEFAULT_SMTP_PORT,
            ssl_smtp_port: DEFAULT_SSL_SMTP_PORT,
            tls: TlsPolicy::default(),
            timeouts: SocketTimeouts::default(),
            credentials: None,
            bounce_address: None,
            session: None,
            sent_date: None,
            state: BuildState::default(),
        }
    }
}

/// Parses every candidate before anything is appended, so a single bad
/// entry leaves `list` untouched.
fn extend_parsed<I, S>(list: &mut Vec<Address>, emails: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed = parse_all(emails)?;
    list.extend(parsed);
    Ok(())
}

fn parse_all<I, S>(emails: I) -> Result<Vec<Address>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    emails
        .into_iter()
        .map(|email| email.as_ref().parse::<Address>().map_err(EmailError::from))
        .collect()
}

fn replace_parsed<I, S>(list: &mut Vec<Address>, emails: I, field: &str) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed = parse_all(emails)?;
    if parsed.is_empty() {
        return Err(EmailError::InvalidArgument(format!(
            "{field} address list can not be empty"
        )));
    }

    *list = parsed;
    Ok(())
}

fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EmailError::InvalidArgument(
            "header name can not be empty".to_string(),
        ));
    }

    if value.is_empty() {
        return Err(EmailError::InvalidArgument(format!(
            "value for header {name:?} can not be empty"
        )));
    }

    if let Some(c) = name.chars().find(|c| !c.is_ascii_graphic() || *c == ':') {
        return Err(EmailError::InvalidArgument(format!(
            "header name {name:?} contains invalid character {c:?}"
        )));
    }

    Ok(())
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Email {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder whose transport settings and charset come from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Fails if the configured bounce address or charset is invalid.
    pub fn from_config(config: &MailerConfig) -> Result<Self> {
        let mut email = Self {
            host_name: config.host_name.clone().filter(|host| !host.is_empty()),
            smtp_port: config.smtp_port,
            ssl_smtp_port: config.ssl_smtp_port,
            tls: config.tls,
            timeouts: config.timeouts,
            credentials: config.credentials.clone(),
            ..Self::default()
        };

        if let Some(bounce) = &config.bounce_address {
            email.set_bounce_address(bounce)?;
        }

        if let Some(charset) = &config.charset {
            email.set_charset(charset)?;
        }

        Ok(email)
    }

    // Addressing

    /// Sets the From address. Accepts `local@domain` or
    /// `Display Name <local@domain>`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn set_from(&mut self, email: &str) -> Result<&mut Self> {
        self.from = Some(email.parse()?);
        Ok(self)
    }

    /// Sets the From address with an explicit display name.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn set_from_named(&mut self, email: &str, name: &str) -> Result<&mut Self> {
        self.from = Some(Address::with_name(email, name)?);
        Ok(self)
    }

    #[must_use]
    pub fn from_address(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    /// Appends a To recipient.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_to(&mut self, email: &str) -> Result<&mut Self> {
        extend_parsed(&mut self.to, [email])?;
        Ok(self)
    }

    /// Appends a To recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_to_named(&mut self, email: &str, name: &str) -> Result<&mut Self> {
        self.to.push(Address::with_name(email, name)?);
        Ok(self)
    }

    /// Appends several To recipients in order. Nothing is appended unless
    /// every address is valid.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] for the first malformed address.
    pub fn add_to_all<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_parsed(&mut self.to, emails)?;
        Ok(self)
    }

    /// Replaces the To list.
    ///
    /// # Errors
    ///
    /// Fails with [`EmailError::InvalidArgument`] for an empty list, or
    /// [`EmailError::InvalidAddress`] for a malformed address.
    pub fn set_to<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_parsed(&mut self.to, emails, "To")?;
        Ok(self)
    }

    #[must_use]
    pub fn to_addresses(&self) -> &[Address] {
        &self.to
    }

    /// Appends a Cc recipient.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_cc(&mut self, email: &str) -> Result<&mut Self> {
        extend_parsed(&mut self.cc, [email])?;
        Ok(self)
    }

    /// Appends a Cc recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_cc_named(&mut self, email: &str, name: &str) -> Result<&mut Self> {
        self.cc.push(Address::with_name(email, name)?);
        Ok(self)
    }

    /// Appends several Cc recipients; all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] for the first malformed address.
    pub fn add_cc_all<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_parsed(&mut self.cc, emails)?;
        Ok(self)
    }

    /// Replaces the Cc list.
    ///
    /// # Errors
    ///
    /// Fails with [`EmailError::InvalidArgument`] for an empty list, or
    /// [`EmailError::InvalidAddress`] for a malformed address.
    pub fn set_cc<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_parsed(&mut self.cc, emails, "Cc")?;
        Ok(self)
    }

    #[must_use]
    pub fn cc_addresses(&self) -> &[Address] {
        &self.cc
    }

    /// Appends a Bcc recipient.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_bcc(&mut self, email: &str) -> Result<&mut Self> {
        extend_parsed(&mut self.bcc, [email])?;
        Ok(self)
    }

    /// Appends a Bcc recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_bcc_named(&mut self, email: &str, name: &str) -> Result<&mut Self> {
        self.bcc.push(Address::with_name(email, name)?);
        Ok(self)
    }

    /// Appends several Bcc recipients; all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] for the first malformed address.
    pub fn add_bcc_all<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_parsed(&mut self.bcc, emails)?;
        Ok(self)
    }

    /// Replaces the Bcc list.
    ///
    /// # Errors
    ///
    /// Fails with [`EmailError::InvalidArgument`] for an empty list, or
    /// [`EmailError::InvalidAddress`] for a malformed address.
    pub fn set_bcc<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_parsed(&mut self.bcc, emails, "Bcc")?;
        Ok(self)
    }

    #[must_use]
    pub fn bcc_addresses(&self) -> &[Address] {
        &self.bcc
    }

    /// Appends a Reply-To address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_reply_to(&mut self, email: &str) -> Result<&mut Self> {
        extend_parsed(&mut self.reply_to, [email])?;
        Ok(self)
    }

    /// Appends a Reply-To address with a display name.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed.
    pub fn add_reply_to_named(&mut self, email: &str, name: &str) -> Result<&mut Self> {
        self.reply_to.push(Address::with_name(email, name)?);
        Ok(self)
    }

    /// Appends several Reply-To addresses; all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] for the first malformed address.
    pub fn add_reply_to_all<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_parsed(&mut self.reply_to, emails)?;
        Ok(self)
    }

    /// Replaces the Reply-To list.
    ///
    /// # Errors
    ///
    /// Fails with [`EmailError::InvalidArgument`] for an empty list, or
    /// [`EmailError::InvalidAddress`] for a malformed address.
    pub fn set_reply_to<I, S>(&mut self, emails: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_parsed(&mut self.reply_to, emails, "Reply-To")?;
        Ok(self)
    }

    #[must_use]
    pub fn reply_to_addresses(&self) -> &[Address] {
        &self.reply_to
    }

    // Headers

    /// Adds a free-form header, overwriting any earlier value for `name`.
    ///
    /// Headers are applied after every structural field when the message
    /// is built, so a `Subject` header replaces the value from
    /// [`Email::set_subject`].
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidArgument`] if `name` or `value` is empty,
    /// or `name` is not a valid field name. The header map is unchanged.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        validate_header(name, value)?;
        self.headers.insert(name.to_string(), value.to_string());
        Ok(self)
    }

    /// Replaces every free-form header. Nothing changes unless every entry
    /// is valid.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidArgument`] for the first invalid entry.
    pub fn set_headers(&mut self, headers: HashMap<String, String>) -> Result<&mut Self> {
        for (name, value) in &headers {
            validate_header(name, value)?;
        }
        self.headers = headers;
        Ok(self)
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    // Content

    pub fn set_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Sets the charset used for text bodies.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidCharset`] if the label is unknown.
    pub fn set_charset(&mut self, charset: &str) -> Result<&mut Self> {
        let charset = charset.trim();
        if encoding_rs::Encoding::for_label(charset.as_bytes()).is_none() {
            return Err(EmailError::InvalidCharset(charset.to_string()));
        }

        self.charset = Some(charset.to_string());
        Ok(self)
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set_content(
        &mut self,
        content: impl Into<String>,
        content_type: impl Into<String>,
    ) -> &mut Self {
        self.content = Some(content.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets a plain text body.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidArgument`] if `msg` is empty.
    pub fn set_msg(&mut self, msg: &str) -> Result<&mut Self> {
        if msg.is_empty() {
            return Err(EmailError::InvalidArgument(
                "Invalid message supplied".to_string(),
            ));
        }

        Ok(self.set_content(msg, DEFAULT_CONTENT_TYPE))
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Sets or clears the sent date. With no explicit date, the date is
    /// taken when it is read.
    pub fn set_sent_date(&mut self, date: impl Into<Option<DateTime<Utc>>>) -> &mut Self {
        self.sent_date = date.into();
        self
    }

    /// The explicit sent date, or the current time if none was set.
    #[must_use]
    pub fn sent_date(&self) -> DateTime<Utc> {
        self.sent_date.unwrap_or_else(Utc::now)
    }

    // Transport configuration

    fn ensure_session_uninitialized(&self) -> Result<()> {
        if self.session.is_some() {
            return Err(EmailError::SessionAlreadyInitialized);
        }
        Ok(())
    }

    /// Sets the SMTP host. An empty string clears it.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_host_name(&mut self, host: impl Into<String>) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        let host = host.into();
        self.host_name = (!host.is_empty()).then_some(host);
        Ok(self)
    }

    /// The explicit host name, falling back to the attached session's host.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.host_name
            .as_deref()
            .or_else(|| self.session.as_ref().and_then(Session::host))
    }

    /// # Errors
    ///
    /// Returns [`EmailError::InvalidArgument`] for port 0, or
    /// [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_smtp_port(&mut self, port: u16) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        if port == 0 {
            return Err(EmailError::InvalidArgument(
                "Cannot connect to a port number that is less than 1".to_string(),
            ));
        }
        self.smtp_port = port;
        Ok(self)
    }

    #[must_use]
    pub const fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    /// Port used instead of the SMTP port under [`TlsPolicy::Implicit`].
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidArgument`] for port 0, or
    /// [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_ssl_smtp_port(&mut self, port: u16) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        if port == 0 {
            return Err(EmailError::InvalidArgument(
                "Cannot connect to a port number that is less than 1".to_string(),
            ));
        }
        self.ssl_smtp_port = port;
        Ok(self)
    }

    #[must_use]
    pub const fn ssl_smtp_port(&self) -> u16 {
        self.ssl_smtp_port
    }

    /// # Errors
    ///
    /// Returns [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_tls_policy(&mut self, tls: TlsPolicy) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        self.tls = tls;
        Ok(self)
    }

    #[must_use]
    pub const fn tls_policy(&self) -> TlsPolicy {
        self.tls
    }

    /// # Errors
    ///
    /// Returns [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_authentication(&mut self, username: &str, password: &str) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        self.credentials = Some(Credentials::new(username, password));
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_socket_timeout(&mut self, timeout: Duration) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        self.timeouts.read_ms = duration_ms(timeout);
        Ok(self)
    }

    #[must_use]
    pub const fn socket_timeout(&self) -> Duration {
        self.timeouts.read_timeout()
    }

    /// # Errors
    ///
    /// Returns [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_socket_connection_timeout(&mut self, timeout: Duration) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        self.timeouts.connect_ms = duration_ms(timeout);
        Ok(self)
    }

    /// Forwarded to the transport; 60 seconds unless configured.
    #[must_use]
    pub const fn socket_connection_timeout(&self) -> Duration {
        self.timeouts.connect_timeout()
    }

    /// Sets the envelope sender used for bounces.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidAddress`] if the address is malformed, or
    /// [`EmailError::SessionAlreadyInitialized`] once a session exists.
    pub fn set_bounce_address(&mut self, email: &str) -> Result<&mut Self> {
        self.ensure_session_uninitialized()?;
        self.bounce_address = Some(email.parse()?);
        Ok(self)
    }

    #[must_use]
    pub fn bounce_address(&self) -> Option<&Address> {
        self.bounce_address.as_ref()
    }

    /// Attaches an externally configured session. Its settings take the
    /// place of the builder's own transport configuration. `None` detaches
    /// the current session.
    pub fn set_mail_session(&mut self, session: impl Into<Option<Session>>) -> &mut Self {
        self.session = session.into();
        self
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.host_name.clone(),
            port: if self.tls.is_implicit() {
                self.ssl_smtp_port
            } else {
                self.smtp_port
            },
            timeouts: self.timeouts,
            tls: self.tls,
            credentials: self.credentials.clone(),
            bounce_address: self.bounce_address.clone(),
        }
    }

    /// Returns the attached session, or derives one from the builder's
    /// transport settings and caches it.
    ///
    /// This never fails. A session without a host is reported by
    /// [`Email::build`].
    pub fn mail_session(&mut self) -> &Session {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let session = Session::new(self.session_config());
                internal!(
                    level = DEBUG,
                    host = ?session.host(),
                    port = session.port(),
                    "Derived mail session"
                );
                session
            }
        };

        self.session.insert(session)
    }

    // Build

    #[must_use]
    pub const fn is_built(&self) -> bool {
        matches!(self.state, BuildState::Built(_))
    }

    /// The message produced by [`Email::build`], if it has run.
    #[must_use]
    pub const fn mime_message(&self) -> Option<&MimeMessage> {
        self.state.message()
    }

    /// Builds the message. This succeeds at most once per builder.
    ///
    /// Validation happens before anything is constructed, so a failed call
    /// leaves the builder unbuilt and can be retried once the missing field
    /// is supplied.
    ///
    /// # Errors
    ///
    /// - [`EmailError::AlreadyBuilt`] on any call after a successful one.
    /// - [`EmailError::MissingSender`] without a From address.
    /// - [`EmailError::MissingRecipient`] with no To, Cc or Bcc recipient.
    /// - [`EmailError::MissingHost`] if no host can be resolved.
    pub fn build(&mut self) -> Result<&MimeMessage> {
        if self.is_built() {
            return Err(EmailError::AlreadyBuilt);
        }

        let from = self.from.clone().ok_or(EmailError::MissingSender)?;

        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(EmailError::MissingRecipient);
        }

        // Checked before the session is cached, so the host can still be set.
        let Some(host) = self.host_name().map(ToString::to_string) else {
            return Err(EmailError::MissingHost);
        };

        // An attached session without a host takes the explicit one.
        if let Some(session) = self.session.take_if(|session| session.host().is_none()) {
            self.session = Some(Session::new(SessionConfig {
                host: Some(host.clone()),
                ..session.config().clone()
            }));
        }
        self.mail_session();

        let mut message = MimeMessage::new();
        message.set_from(&from);
        message.add_recipients(RecipientType::To, &self.to);
        message.add_recipients(RecipientType::Cc, &self.cc);
        message.add_recipients(RecipientType::Bcc, &self.bcc);
        for address in &self.reply_to {
            message.add_reply_to(address);
        }

        if let Some(subject) = &self.subject {
            message.set_subject(subject.as_str());
        }

        message.set_body(
            self.content.as_deref().unwrap_or_default(),
            self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE),
            self.charset.as_deref(),
        );
        message.set_sent_date(self.sent_date());

        let mut headers: Vec<_> = self.headers.iter().collect();
        headers.sort();
        for (name, value) in headers {
            message.set_header(name.as_str(), value.as_str());
        }

        message.save_changes(Some(&host));

        internal!(
            level = DEBUG,
            message_id = ?message.message_id(),
            recipients = message.all_recipients().count(),
            "Built message"
        );

        self.state = BuildState::Built(message);
        self.state.message().ok_or(EmailError::NotBuilt)
    }

    /// Builds the message and hands it to `transport`.
    ///
    /// Returns the Message-ID of the sent message.
    ///
    /// # Errors
    ///
    /// Any error from [`Email::build`], or [`EmailError::Transport`] if the
    /// transport rejects the message.
    pub async fn send<T>(&mut self, transport: &T) -> Result<String>
    where
        T: Transport + ?Sized,
    {
        self.build()?;
        self.send_built(transport).await
    }

    /// Hands an already built message to `transport`.
    ///
    /// # Errors
    ///
    /// [`EmailError::NotBuilt`] if [`Email::build`] has not succeeded, or
    /// [`EmailError::Transport`] if the transport rejects the message.
    pub async fn send_built<T>(&self, transport: &T) -> Result<String>
    where
        T: Transport + ?Sized,
    {
        let (Some(message), Some(session)) = (self.state.message(), self.session.as_ref()) else {
            return Err(EmailError::NotBuilt);
        };

        transport.send(session, message).await?;

        let message_id = message.message_id().unwrap_or_default().to_string();
        outgoing!(
            level = INFO,
            message_id = %message_id,
            host = ?session.host(),
            "Message handed to transport"
        );

        Ok(message_id)
    }
}
