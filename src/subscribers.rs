//! Loads the monitored subscribers from their JSON file.

use crate::core::Subscriber;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Reads the list of subscribers from `path`.
///
/// The file is a JSON array of `{name, email, slack, pincode, district}`
/// objects. Ids may be numbers or strings.
pub fn load(path: &Path) -> Result<Vec<Subscriber>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read subscribers file {}", path.display()))?;
    let subscribers: Vec<Subscriber> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse subscribers file {}", path.display()))?;
    info!(count = subscribers.len(), path = %path.display(), "Loaded subscribers");
    Ok(subscribers)
}
