//! The live notifier: one Slack message and one email per digest.

use crate::config::Config;
use crate::core::{Notify, SubscriberDigest};
use crate::formatting::{EmailTextFormatter, SlackTextFormatter, TextFormatter};
use crate::notification::email::{EmailClient, SmtpEmailClient};
use crate::notification::failure_log::FailureLog;
use crate::notification::slack::{ChatClient, ChatDelivery, SlackClient};
use crate::notification::NotifyError;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Sends each digest to Slack, then by email.
pub struct Notifier {
    chat: Arc<dyn ChatClient>,
    email: Arc<dyn EmailClient>,
    chat_formatter: Box<dyn TextFormatter>,
    email_formatter: Box<dyn TextFormatter>,
    subject: String,
    failure_log: FailureLog,
}

impl Notifier {
    /// Creates a new `Notifier` from its channel clients.
    pub fn new(
        config: &Config,
        chat: Arc<dyn ChatClient>,
        email: Arc<dyn EmailClient>,
    ) -> Self {
        let notification = &config.notification;
        Self {
            chat,
            email,
            chat_formatter: Box::new(SlackTextFormatter::new(notification.booking_url.clone())),
            email_formatter: Box::new(EmailTextFormatter::new(
                notification.booking_url.clone(),
                notification.sender_name.clone(),
            )),
            subject: notification.email_subject.clone(),
            failure_log: FailureLog::new(notification.failure_log.clone()),
        }
    }

    /// Builds the live Slack and SMTP clients.
    ///
    /// Fails when the webhook URL, the sender address or the SMTP password is
    /// not configured.
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let webhook_url = config
            .slack
            .webhook_url
            .clone()
            .ok_or(NotifyError::MissingSetting("slack.webhook_url"))?;
        let chat = SlackClient::new(webhook_url, Duration::from_secs(config.slack.timeout_secs))?;
        let email = SmtpEmailClient::from_config(&config.email)?;
        Ok(Self::new(config, Arc::new(chat), Arc::new(email)))
    }

    /// Posts the chat message. A rejection is recorded, not returned.
    async fn send_chat(&self, digest: &SubscriberDigest) -> Result<(), NotifyError> {
        let message = self.chat_formatter.format_digest(digest);
        match self.chat.post(&message).await? {
            ChatDelivery::Delivered => {}
            ChatDelivery::Rejected { status, .. } => {
                warn!(
                    status,
                    path = %self.failure_log.path().display(),
                    "Slack post rejected, recording to failure log"
                );
                if let Err(e) = self.failure_log.record(&digest.content).await {
                    error!(error = %e, "Failed to write failure log");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Notify for Notifier {
    fn name(&self) -> &str {
        "slack+email"
    }

    #[instrument(skip_all, fields(subscriber = %digest.subscriber.name))]
    async fn notify(&self, digest: &SubscriberDigest) -> Result<()> {
        self.send_chat(digest).await?;

        let body = self.email_formatter.format_digest(digest);
        self.email
            .send(&digest.subscriber.email, &self.subject, &body)
            .await?;

        info!("Notified subscriber.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Subscriber;
    use std::sync::Mutex;

    // A fake chat client that records messages and answers with a fixed outcome.
    struct FakeChat {
        outcome: ChatDelivery,
        sent: Mutex<Vec<String>>,
    }

    impl FakeChat {
        fn new(outcome: ChatDelivery) -> Self {
            Self {
                outcome,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for FakeChat {
        async fn post(&self, text: &str) -> Result<ChatDelivery, NotifyError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(self.outcome.clone())
        }
    }

    #[derive(Default)]
    struct FakeEmail {
        fail: bool,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl EmailClient for FakeEmail {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::MissingSetting("email.password"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn digest() -> SubscriberDigest {
        SubscriberDigest {
            subscriber: Subscriber {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                slack: "U1".to_string(),
                pincode: vec!["110001".to_string()],
                district: vec![],
            },
            content: "slots at CenterA".to_string(),
        }
    }

    fn config_with_log(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.notification.failure_log = dir.path().join("running_check.txt");
        config
    }

    #[tokio::test]
    async fn test_delivers_chat_then_email() {
        let dir = tempfile::tempdir().unwrap();
        let chat = Arc::new(FakeChat::new(ChatDelivery::Delivered));
        let email = Arc::new(FakeEmail::default());
        let notifier = Notifier::new(&config_with_log(&dir), chat.clone(), email.clone());

        notifier.notify(&digest()).await.unwrap();

        let chats = chat.sent.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert!(chats[0].starts_with("Hi <@U1> :wave:,\nslots at CenterA"));

        let emails = email.sent.lock().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].0, "asha@example.com");
        assert_eq!(emails[0].1, "Slot availability at cowin");
        assert!(emails[0].2.contains("slots at CenterA"));

        assert!(!dir.path().join("running_check.txt").exists());
    }

    #[tokio::test]
    async fn test_rejected_chat_is_logged_and_email_still_sent() {
        let dir = tempfile::tempdir().unwrap();
        let chat = Arc::new(FakeChat::new(ChatDelivery::Rejected {
            status: 500,
            body: "oops".to_string(),
        }));
        let email = Arc::new(FakeEmail::default());
        let notifier = Notifier::new(&config_with_log(&dir), chat, email.clone());

        let result = notifier.notify(&digest()).await;

        assert!(result.is_ok());
        assert_eq!(email.sent.lock().unwrap().len(), 1);
        let log = std::fs::read_to_string(dir.path().join("running_check.txt")).unwrap();
        assert!(log.starts_with("Error posting at slack,time="));
        assert!(log.trim_end().ends_with("content=slots at CenterA"));
    }

    #[tokio::test]
    async fn test_email_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let chat = Arc::new(FakeChat::new(ChatDelivery::Delivered));
        let email = Arc::new(FakeEmail {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::new(&config_with_log(&dir), chat, email);

        assert!(notifier.notify(&digest()).await.is_err());
    }

    #[test]
    fn test_missing_webhook_is_fatal() {
        let mut config = Config::default();
        config.email.from_address = Some("alerts@example.com".to_string());
        config.email.password = Some("secret".to_string());

        assert!(matches!(
            Notifier::from_config(&config),
            Err(NotifyError::MissingSetting("slack.webhook_url"))
        ));
    }
}
