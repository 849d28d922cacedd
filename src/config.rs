//! Configuration management for slotwatch
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a `slotwatch.toml` file and merge it
//! with environment variables and command-line arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "slotwatch.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Path to the JSON file listing the subscribers.
    pub subscribers_file: PathBuf,
    /// Maximum number of calendar requests in flight for one date.
    pub concurrency: usize,
    /// Configuration for the CoWIN API client.
    pub api: ApiConfig,
    /// The dates probed in one run.
    pub window: WindowConfig,
    /// Session eligibility rules.
    pub filter: FilterConfig,
    /// Message content shared by all channels.
    pub notification: NotificationConfig,
    /// Configuration for Slack messages.
    pub slack: SlackConfig,
    /// Configuration for email delivery.
    pub email: EmailConfig,
}

/// Configuration for the CoWIN API client.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without a trailing `/v2/...` path.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cowin.gov.in/api".to_string(),
            timeout_secs: 10,
            user_agent: concat!("slotwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// The dates probed in one run: today plus `dates - 1` further steps.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub dates: usize,
    pub step_days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            dates: 4,
            step_days: 7,
        }
    }
}

/// How a session's `min_age_limit` is compared with `age`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgeMatch {
    /// `min_age_limit == age`
    #[default]
    Exact,
    /// `min_age_limit <= age`
    Eligible,
}

/// Session eligibility rules.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub age: u32,
    pub age_match: AgeMatch,
    /// Sessions need strictly more than this many open slots.
    pub min_capacity: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            age: 18,
            age_match: AgeMatch::Exact,
            min_capacity: 1,
        }
    }
}

/// Message content shared by all channels.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    /// Booking site linked from every message.
    pub booking_url: String,
    pub email_subject: String,
    /// Name used to sign emails.
    pub sender_name: String,
    /// Append-only file recording chat posts that were rejected.
    pub failure_log: PathBuf,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            booking_url: "https://www.cowin.gov.in/home".to_string(),
            email_subject: "Slot availability at cowin".to_string(),
            sender_name: "slotwatch".to_string(),
            failure_log: PathBuf::from("running_check.txt"),
        }
    }
}

/// Configuration for Slack messages.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SlackConfig {
    /// The Slack incoming webhook URL. Required only when something is sent.
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

/// Configuration for email delivery over SMTP submission with STARTTLS.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender mailbox, e.g. `Slot Alerts <alerts@example.com>`.
    pub from_address: Option<String>,
    /// SMTP login. Falls back to the bare address of `from_address`.
    pub username: Option<String>,
    /// SMTP password (an app password for Gmail).
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            from_address: None,
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads the application configuration by layering defaults, the TOML
    /// file, `SLOTWATCH_` environment variables and command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // e.g. SLOTWATCH_SLACK__WEBHOOK_URL, SLOTWATCH_EMAIL__PASSWORD
            .merge(Env::prefixed("SLOTWATCH_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            subscribers_file: PathBuf::from("user_info.json"),
            concurrency: 1,
            api: ApiConfig::default(),
            window: WindowConfig::default(),
            filter: FilterConfig::default(),
            notification: NotificationConfig::default(),
            slack: SlackConfig::default(),
            email: EmailConfig::default(),
        }
    }
}
