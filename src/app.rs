//! The main application logic, decoupled from the entry point.

use crate::{
    aggregation::Aggregator,
    api::CowinClient,
    config::Config,
    core::{AvailabilitySource, DateWindow, Notify},
    filter::SlotFilter,
    notification::{Notifier, StdoutNotifier},
    subscribers,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument};

/// What one run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub subscribers: usize,
    pub fetches: usize,
    pub digests: usize,
    pub notified: usize,
}

/// A configured single-pass run.
pub struct App {
    config: Config,
    source: Arc<dyn AvailabilitySource>,
    notifier_override: Option<Arc<dyn Notify>>,
    dry_run: bool,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// Checks availability across the window starting at `today` and
    /// notifies every subscriber with something to report.
    ///
    /// The live notifier is only built when there is at least one digest, so
    /// missing delivery secrets only fail runs that need them.
    #[instrument(skip(self))]
    pub async fn run_once(&self, today: NaiveDate) -> Result<RunSummary> {
        let subscribers = subscribers::load(&self.config.subscribers_file)?;
        let window = DateWindow::stepped(
            today,
            self.config.window.dates,
            self.config.window.step_days,
        )
        .context("Invalid date window")?;

        let aggregator = Aggregator::new(
            self.source.clone(),
            SlotFilter::new(&self.config.filter),
            self.config.concurrency,
        );
        let results = aggregator
            .collect(&subscribers, &window)
            .await
            .context("Failed to collect availability")?;
        let digests = Aggregator::distribute(&subscribers, &results);

        let mut summary = RunSummary {
            subscribers: subscribers.len(),
            fetches: results.fetch_count(),
            digests: digests.len(),
            notified: 0,
        };

        if digests.is_empty() {
            info!("Nothing to alert");
            return Ok(summary);
        }

        let notifier = self.notifier()?;
        info!(
            notifier = notifier.name(),
            digests = digests.len(),
            "Dispatching notifications"
        );
        for digest in &digests {
            notifier.notify(digest).await.with_context(|| {
                format!("Failed to notify {}", digest.subscriber.name)
            })?;
            summary.notified += 1;
        }

        Ok(summary)
    }

    fn notifier(&self) -> Result<Arc<dyn Notify>> {
        if let Some(notifier) = &self.notifier_override {
            return Ok(notifier.clone());
        }
        if self.dry_run {
            return Ok(Arc::new(StdoutNotifier));
        }
        let notifier =
            Notifier::from_config(&self.config).context("Failed to set up notifications")?;
        Ok(Arc::new(notifier))
    }
}

/// Builder for the main application.
///
/// Collaborators can be overridden for testing; anything not overridden is
/// built from the configuration.
pub struct AppBuilder {
    config: Config,
    source_override: Option<Arc<dyn AvailabilitySource>>,
    notifier_override: Option<Arc<dyn Notify>>,
    dry_run: bool,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source_override: None,
            notifier_override: None,
            dry_run: false,
        }
    }

    /// Overrides the availability source.
    pub fn source_override(mut self, source: Arc<dyn AvailabilitySource>) -> Self {
        self.source_override = Some(source);
        self
    }

    /// Overrides the notifier.
    pub fn notifier_override(mut self, notifier: Arc<dyn Notify>) -> Self {
        self.notifier_override = Some(notifier);
        self
    }

    /// Prints digests to stdout instead of sending them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<App> {
        let source: Arc<dyn AvailabilitySource> = match self.source_override {
            Some(source) => source,
            None => Arc::new(
                CowinClient::new(&self.config.api).context("Failed to build API client")?,
            ),
        };
        Ok(App {
            config: self.config,
            source,
            notifier_override: self.notifier_override,
            dry_run: self.dry_run,
        })
    }
}
