#![allow(clippy::expect_used, clippy::unwrap_used)]

use mailparse::{MailHeaderMap, parse_mail};
use missive_common::Address;
use missive_transport::{
    MemoryTransport, MimeMessage, RecipientType, Session, SessionConfig, Transport,
    TransportError,
};

fn addr(email: &str) -> Address {
    Address::new(email).unwrap()
}

fn finalized_message() -> MimeMessage {
    let mut message = MimeMessage::new();
    message.set_from(&addr("sender@demo.com"));
    message.add_recipient(RecipientType::To, &addr("receiver@demo.com"));
    message.add_recipient(RecipientType::Bcc, &addr("audit@demo.com"));
    message.set_subject("Successful Build Test");
    message.set_body("This is a test email.", "text/plain", Some("UTF-8"));
    message.save_changes(Some("testhost.local"));
    message
}

#[tokio::test]
async fn test_records_envelope_and_data() {
    let transport = MemoryTransport::new();
    let session = Session::new(SessionConfig {
        port: 2525,
        ..SessionConfig::with_host("testhost.local")
    });
    let message = finalized_message();

    transport.send(&session, &message).await.unwrap();

    assert_eq!(transport.len(), 1);
    let sent = transport.messages().unwrap().remove(0);
    assert_eq!(sent.host, "testhost.local");
    assert_eq!(sent.port, 2525);
    assert_eq!(sent.envelope_from, addr("sender@demo.com"));
    assert_eq!(
        sent.recipients,
        vec![addr("receiver@demo.com"), addr("audit@demo.com")]
    );
    assert_eq!(sent.message_id.as_deref(), message.message_id());

    let parsed = parse_mail(sent.data.as_bytes()).unwrap();
    assert_eq!(
        parsed.headers.get_first_value("Subject").as_deref(),
        Some("Successful Build Test")
    );
    assert_eq!(
        parsed.headers.get_first_value("To").as_deref(),
        Some("receiver@demo.com")
    );
    assert!(parsed.headers.get_first_value("Bcc").is_none());
    assert_eq!(parsed.ctype.mimetype, "text/plain");
    assert!(parsed.ctype.charset.eq_ignore_ascii_case("utf-8"));
    assert_eq!(parsed.get_body().unwrap().trim_end(), "This is a test email.");
}

#[tokio::test]
async fn test_bounce_address_overrides_envelope_sender() {
    let transport = MemoryTransport::new();
    let session = Session::new(SessionConfig {
        bounce_address: Some(addr("bounces@demo.com")),
        ..SessionConfig::with_host("testhost.local")
    });

    transport.send(&session, &finalized_message()).await.unwrap();

    let sent = transport.messages().unwrap().remove(0);
    assert_eq!(sent.envelope_from, addr("bounces@demo.com"));
    assert!(sent.data.contains("From: sender@demo.com\r\n"));
}

#[tokio::test]
async fn test_rejects_unfinalized_message() {
    let transport = MemoryTransport::new();
    let session = Session::new(SessionConfig::with_host("testhost.local"));
    let mut message = finalized_message();
    message.set_subject("Edited after finalizing");

    let result = transport.send(&session, &message).await;

    assert!(matches!(result, Err(TransportError::NotFinalized)));
    assert!(transport.is_empty());
}

#[tokio::test]
async fn test_rejects_session_without_host() {
    let transport = MemoryTransport::new();
    let session = Session::new(SessionConfig::default());

    let result = transport.send(&session, &finalized_message()).await;

    assert!(matches!(result, Err(TransportError::MissingHost)));
}

#[tokio::test]
async fn test_rejects_message_without_recipients() {
    let transport = MemoryTransport::new();
    let session = Session::new(SessionConfig::with_host("testhost.local"));
    let mut message = MimeMessage::new();
    message.set_from(&addr("sender@demo.com"));
    message.save_changes(None);

    let result = transport.send(&session, &message).await;

    assert!(matches!(result, Err(TransportError::NoRecipients)));
}

#[tokio::test]
async fn test_clones_share_store() {
    let transport = MemoryTransport::new();
    let observer = transport.clone();
    let session = Session::new(SessionConfig::with_host("testhost.local"));

    transport.send(&session, &finalized_message()).await.unwrap();
    transport.send(&session, &finalized_message()).await.unwrap();

    assert_eq!(observer.len(), 2);
}
