//! A notifier that records digests instead of delivering them.

use anyhow::Result;
use async_trait::async_trait;
use slotwatch::core::{Notify, SubscriberDigest};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<SubscriberDigest>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SubscriberDigest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, digest: &SubscriberDigest) -> Result<()> {
        self.sent.lock().unwrap().push(digest.clone());
        Ok(())
    }
}
