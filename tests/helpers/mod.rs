//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mock_cowin;
pub mod recording_notifier;

use slotwatch::config::Config;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes a subscribers file and returns it; the file lives as long as the handle.
pub fn subscribers_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();
    file
}

/// A config pointing at a mock API and a subscribers file, probing a single date.
pub fn test_config(api_base: &str, subscribers: &Path, dates: usize) -> Config {
    let mut config = Config::default();
    config.api.base_url = api_base.to_string();
    config.api.timeout_secs = 5;
    config.subscribers_file = subscribers.to_path_buf();
    config.window.dates = dates;
    config
}
