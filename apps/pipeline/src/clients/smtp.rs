use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::debug;

use super::{Mailer, OutgoingMail};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("mail task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Authenticated relay over implicit TLS (SMTPS).
#[derive(Clone)]
pub struct SmtpMailer {
    server: String,
    port: u16,
    username: String,
    password: String,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        server: String,
        port: u16,
        username: String,
        password: String,
        from_address: &str,
    ) -> Result<Self, MailError> {
        let from = Mailbox::new(None, from_address.parse::<Address>()?);
        Ok(Self {
            server,
            port,
            username,
            password,
            from,
        })
    }
}

fn build_message(from: &Mailbox, mail: OutgoingMail) -> Result<Message, MailError> {
    let to = Mailbox::new(Some(mail.to_name), mail.to_address.parse::<Address>()?);
    Ok(Message::builder()
        .from(from.clone())
        .to(to)
        .subject(mail.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body)?)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let recipient = mail.to_address.clone();
        let message = build_message(&self.from, mail)?;

        let transport = SmtpTransport::relay(&self.server)?
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();

        // lettre's SmtpTransport blocks on network I/O.
        tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        debug!("Email sent to {recipient}");
        Ok(())
    }
}
