//! Email delivery over SMTP submission.

use super::NotifyError;
use crate::config::EmailConfig;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{info, instrument};

/// A trait for clients that can deliver a plain-text email.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends mail through an authenticated SMTP relay, upgrading the connection
/// with STARTTLS before logging in.
pub struct SmtpEmailClient {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailClient {
    /// Builds the client from config. The sender address and password must
    /// be set.
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotifyError> {
        let from_address = config
            .from_address
            .as_deref()
            .ok_or(NotifyError::MissingSetting("email.from_address"))?;
        let password = config
            .password
            .clone()
            .ok_or(NotifyError::MissingSetting("email.password"))?;

        let from: Mailbox = from_address.parse().map_err(|source| NotifyError::Address {
            address: from_address.to_string(),
            source,
        })?;
        let username = config
            .username
            .clone()
            .unwrap_or_else(|| from.email.to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(NotifyError::Smtp)?
            .port(config.smtp_port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self { from, transport })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, NotifyError> {
        let to: Mailbox = to.parse().map_err(|source| NotifyError::Address {
            address: to.to_string(),
            source,
        })?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(NotifyError::Message)
    }
}

#[async_trait]
impl EmailClient for SmtpEmailClient {
    #[instrument(skip(self, body))]
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.build_message(to, subject, body)?;
        self.transport.send(message).await.map_err(NotifyError::Smtp)?;
        info!("Email sent.");
        Ok(())
    }
}
