use crate::error::{ExtractGenError, Result};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Anything that can take a finished message and hand it on for delivery.
pub trait MailRelay {
    fn deliver(&self, message: &Message) -> Result<()>;
}

/// Plain SMTP submission, no TLS and no authentication.
pub struct SmtpRelay {
    host: String,
    transport: SmtpTransport,
}

impl SmtpRelay {
    pub fn new(host: &str, port: u16) -> Self {
        let transport = SmtpTransport::builder_dangerous(host).port(port).build();
        Self {
            host: host.to_string(),
            transport,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl MailRelay for SmtpRelay {
    fn deliver(&self, message: &Message) -> Result<()> {
        self.transport.send(message)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub html_body: String,
    /// File name under the notifier's data directory.
    pub attachment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub attachment: String,
}

pub struct Notifier {
    relay: Box<dyn MailRelay>,
    data_dir: PathBuf,
}

impl Notifier {
    pub fn new<P: Into<PathBuf>>(relay: Box<dyn MailRelay>, data_dir: P) -> Self {
        Self {
            relay,
            data_dir: data_dir.into(),
        }
    }

    /// Build the message with the extract attached and submit it once.
    /// Nothing is submitted when the attachment cannot be read.
    pub fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt> {
        let path = self.data_dir.join(&email.attachment);

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ExtractGenError::AttachmentNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let message = build_message(email, content)?;

        tracing::info!("Sending email to {:?}", email.to);
        self.relay.deliver(&message)?;
        tracing::info!("{} has been sent successfully.", email.attachment);

        Ok(DeliveryReceipt {
            to: email.to.clone(),
            cc: email.cc.clone(),
            subject: email.subject.clone(),
            attachment: email.attachment.clone(),
        })
    }
}

pub fn build_message(email: &OutgoingEmail, attachment: Vec<u8>) -> Result<Message> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .subject(email.subject.clone());

    for address in &email.to {
        builder = builder.to(parse_mailbox(address)?);
    }
    for address in &email.cc {
        builder = builder.cc(parse_mailbox(address)?);
    }

    let html = SinglePart::html(html_document(&email.html_body));

    let body = Body::new_with_encoding(attachment, ContentTransferEncoding::Base64).map_err(|_| {
        ExtractGenError::MessageBuild {
            message: "attachment could not be base64 encoded".to_string(),
        }
    })?;
    let octet_stream =
        ContentType::parse("application/octet-stream").map_err(|e| ExtractGenError::MessageBuild {
            message: e.to_string(),
        })?;
    let attachment = Attachment::new(email.attachment.clone()).body(body, octet_stream);

    let message = builder.multipart(MultiPart::mixed().singlepart(html).singlepart(attachment))?;
    Ok(message)
}

fn html_document(body: &str) -> String {
    format!("<html>\n<body>\n{}\n</body>\n</html>\n", body)
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|_| ExtractGenError::InvalidAddress {
        address: address.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingRelay, RecordingRelay};
    use super::*;
    use tempfile::TempDir;

    fn orders_email() -> OutgoingEmail {
        OutgoingEmail {
            from: "tech@abc.com".to_string(),
            to: vec!["a@x.com".to_string()],
            cc: vec!["b@x.com".to_string()],
            subject: "Orders - 20240101".to_string(),
            html_body: "See attached".to_string(),
            attachment: "orders_20240101.csv".to_string(),
        }
    }

    fn data_dir_with_extract() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("orders_20240101.csv"),
            "id,amount\n1,100\n2,200\n",
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_send_builds_multipart_with_attachment() {
        let temp_dir = data_dir_with_extract();
        let relay = RecordingRelay::default();
        let notifier = Notifier::new(Box::new(relay.clone()), temp_dir.path());

        let receipt = notifier.send(&orders_email()).unwrap();
        assert_eq!(receipt.to, vec!["a@x.com"]);

        let sent = relay.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].envelope_to, vec!["a@x.com", "b@x.com"]);

        let raw = &sent[0].raw;
        assert!(raw.contains("Subject: Orders - 20240101"));
        assert!(raw.contains("From: tech@abc.com"));
        assert!(raw.contains("To: a@x.com"));
        assert!(raw.contains("Cc: b@x.com"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("See attached"));
        assert!(raw.contains("Content-Type: application/octet-stream"));
        assert!(raw.contains("Content-Disposition: attachment"));
        assert!(raw.contains("orders_20240101.csv"));
        assert!(raw.contains("Content-Transfer-Encoding: base64"));
        assert!(raw.contains("aWQsYW1vdW50CjEsMTAwCjIsMjAwCg=="));
    }

    #[test]
    fn test_missing_attachment_sends_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let relay = RecordingRelay::default();
        let notifier = Notifier::new(Box::new(relay.clone()), temp_dir.path());

        let err = notifier.send(&orders_email()).unwrap_err();
        assert!(matches!(err, ExtractGenError::AttachmentNotFound { .. }));
        assert!(relay.messages().is_empty());
    }

    #[test]
    fn test_invalid_recipient() {
        let temp_dir = data_dir_with_extract();
        let relay = RecordingRelay::default();
        let notifier = Notifier::new(Box::new(relay.clone()), temp_dir.path());

        let mut email = orders_email();
        email.to = vec!["not an address".to_string()];

        let err = notifier.send(&email).unwrap_err();
        assert!(matches!(err, ExtractGenError::InvalidAddress { .. }));
        assert!(relay.messages().is_empty());
    }

    #[test]
    fn test_relay_failure_is_surfaced() {
        let temp_dir = data_dir_with_extract();
        let notifier = Notifier::new(Box::new(FailingRelay), temp_dir.path());

        let err = notifier.send(&orders_email()).unwrap_err();
        assert!(matches!(err, ExtractGenError::Relay { .. }));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_no_cc_recipients() {
        let mut email = orders_email();
        email.cc.clear();

        let message = build_message(&email, b"x".to_vec()).unwrap();
        assert_eq!(message.envelope().to().len(), 1);
    }

    #[test]
    fn test_smtp_relay_construction() {
        let relay = SmtpRelay::new("mailhost", 25);
        assert_eq!(relay.host(), "mailhost");
    }
}
