//! slotwatch - vaccination slot availability notifier
//!
//! Runs a single pass: checks the configured locations over the date window,
//! notifies subscribers, and exits. Scheduling is left to cron or a timer.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use slotwatch::{
    api::CowinClient,
    app::App,
    cli::{Cli, Command},
    config::Config,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        init_tracing("info");
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    init_tracing(&config.log_level);

    match cli.command.clone().unwrap_or(Command::Run) {
        Command::Run => run(&cli, config).await,
        Command::States => {
            let client = CowinClient::new(&config.api)?;
            for (name, id) in client.list_states().await? {
                println!("{id}\t{name}");
            }
            Ok(())
        }
        Command::Districts { state_id } => {
            let client = CowinClient::new(&config.api)?;
            let districts = client.list_districts(state_id).await?;
            println!("{}", serde_json::to_string_pretty(&districts)?);
            Ok(())
        }
    }
}

async fn run(cli: &Cli, config: Config) -> Result<()> {
    info!("slotwatch starting up...");

    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Subscribers File: {}", config.subscribers_file.display());
    info!("API Base URL: {}", config.api.base_url);
    info!("API Timeout: {}s", config.api.timeout_secs);
    info!(
        "Date Window: {} dates, {} days apart",
        config.window.dates, config.window.step_days
    );
    info!(
        "Filter: age {} ({:?}), capacity > {}",
        config.filter.age, config.filter.age_match, config.filter.min_capacity
    );
    info!("Concurrency: {}", config.concurrency);
    info!("Dry Run: {}", cli.dry_run);
    info!(
        "Slack Webhook: {}",
        if config.slack.webhook_url.is_some() {
            "Set"
        } else {
            "Not set"
        }
    );
    info!(
        "SMTP: {}:{} (password {})",
        config.email.smtp_host,
        config.email.smtp_port,
        if config.email.password.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    info!("-------------------------------------------------------");

    let app = App::builder(config).dry_run(cli.dry_run).build()?;
    let summary = app
        .run_once(Local::now().date_naive())
        .await
        .context("Run failed")?;

    info!(
        subscribers = summary.subscribers,
        fetches = summary.fetches,
        digests = summary.digests,
        notified = summary.notified,
        "Run complete"
    );
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
