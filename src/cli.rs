//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the `slotwatch.toml` file and environment variables.

use clap::{Parser, Subcommand};
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Checks vaccination slot availability once and notifies subscribers.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the JSON file listing the subscribers.
    #[arg(short, long, value_name = "FILE")]
    pub subscribers: Option<PathBuf>,

    /// Number of dates to probe, one step apart, starting today.
    #[arg(long, value_name = "N")]
    pub dates: Option<usize>,

    /// Maximum number of calendar requests in flight.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Log level filter (overridden by RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the digests instead of sending them.
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check availability and notify subscribers (the default).
    Run,
    /// List state names and ids.
    States,
    /// Print the district listing for a state.
    Districts {
        #[arg(long, value_name = "ID")]
        state_id: u32,
    },
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(path) = &self.subscribers {
            dict.insert(
                "subscribers_file".into(),
                Value::from(path.display().to_string()),
            );
        }

        if let Some(concurrency) = self.concurrency {
            dict.insert("concurrency".into(), Value::from(concurrency));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(dates) = self.dates {
            let mut window = Dict::new();
            window.insert("dates".into(), Value::from(dates));
            dict.insert("window".into(), Value::from(window));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
