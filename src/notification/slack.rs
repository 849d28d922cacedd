//! A client for sending notifications to Slack.

use super::NotifyError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Outcome of a webhook post that reached Slack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatDelivery {
    Delivered,
    Rejected { status: u16, body: String },
}

/// A trait for clients that can post a chat message.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Posts `text`.
    ///
    /// # Returns
    /// * `Ok(ChatDelivery::Rejected { .. })` when Slack answered with anything but `200 OK`
    /// * `Err` when the request itself failed
    async fn post(&self, text: &str) -> Result<ChatDelivery, NotifyError>;
}

/// A client for sending messages to a Slack webhook.
pub struct SlackClient {
    webhook_url: String,
    http: reqwest::Client,
}

impl SlackClient {
    /// Creates a new `SlackClient`.
    pub fn new(webhook_url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NotifyError::Chat)?;
        Ok(Self { webhook_url, http })
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    /// Sends `{"text": ...}` to the configured Slack webhook.
    #[instrument(skip_all, fields(chars = text.len()))]
    async fn post(&self, text: &str) -> Result<ChatDelivery, NotifyError> {
        let payload = json!({ "text": text });
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(NotifyError::Chat)?;

        let status = response.status();
        if status == StatusCode::OK {
            info!("Successfully sent message to Slack.");
            Ok(ChatDelivery::Delivered)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                body = %body,
                "Slack rejected the notification"
            );
            Ok(ChatDelivery::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
