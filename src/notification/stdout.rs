//! Prints digests instead of delivering them, for dry runs.

use crate::core::{Notify, SubscriberDigest};
use anyhow::Result;
use async_trait::async_trait;

pub struct StdoutNotifier;

#[async_trait]
impl Notify for StdoutNotifier {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn notify(&self, digest: &SubscriberDigest) -> Result<()> {
        let subscriber = &digest.subscriber;
        println!(
            "--- {} <{}> (@{}) ---{}",
            subscriber.name, subscriber.email, subscriber.slack, digest.content
        );
        Ok(())
    }
}
