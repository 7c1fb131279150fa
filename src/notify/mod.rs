pub mod mailer;

pub use mailer::{DeliveryReceipt, MailRelay, Notifier, OutgoingEmail, SmtpRelay};
