//! Fetches every location once per date and folds the results into one
//! digest per subscriber.
//!
//! The work happens in two passes. `collect` walks the date window and, for
//! each date, looks up every distinct location key referenced by any
//! subscriber exactly once, appending the rendered lines to a per-key
//! accumulator. `distribute` then walks the subscribers and assembles each
//! digest from the shared per-key text, so subscribers sharing a location
//! never cause extra requests.

use crate::api::ApiError;
use crate::core::{
    AvailabilitySource, DateWindow, LocationKey, SlotLookup, Subscriber, SubscriberDigest,
};
use crate::filter::SlotFilter;
use crate::formatting::location_section;
use futures::{stream, StreamExt, TryStreamExt};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The accumulated lookup results of one run, keyed by location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationResults {
    texts: BTreeMap<LocationKey, String>,
    fetched: BTreeSet<LocationKey>,
    fetches: usize,
}

impl LocationResults {
    /// The outcome for `key` across the whole window.
    pub fn lookup(&self, key: &LocationKey) -> SlotLookup {
        match self.texts.get(key) {
            Some(text) => SlotLookup::Found(text.clone()),
            None if self.fetched.contains(key) => SlotLookup::Empty,
            None => SlotLookup::NotComputed,
        }
    }

    /// Non-blank accumulated text for `key`, if any.
    pub fn text(&self, key: &LocationKey) -> Option<&str> {
        self.texts
            .get(key)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Number of calendar requests issued.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Keys with something to report, in key order.
    pub fn found_keys(&self) -> impl Iterator<Item = &LocationKey> {
        self.texts.keys()
    }

    fn record(&mut self, key: LocationKey, lookup: SlotLookup) {
        self.fetches += 1;
        if let SlotLookup::Found(text) = lookup {
            let text = text.trim();
            self.texts
                .entry(key.clone())
                .and_modify(|existing| {
                    existing.push('\n');
                    existing.push_str(text);
                })
                .or_insert_with(|| text.to_string());
        }
        self.fetched.insert(key);
    }
}

/// Runs the fetch and filter stages over a date window.
pub struct Aggregator {
    source: Arc<dyn AvailabilitySource>,
    filter: SlotFilter,
    concurrency: usize,
}

impl Aggregator {
    /// Creates a new `Aggregator`.
    ///
    /// # Arguments
    /// * `source` - Where calendars are fetched from.
    /// * `filter` - Which sessions count as available.
    /// * `concurrency` - Requests in flight per date; `0` is treated as `1`.
    pub fn new(
        source: Arc<dyn AvailabilitySource>,
        filter: SlotFilter,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            filter,
            concurrency: concurrency.max(1),
        }
    }

    /// Looks up every distinct location of `subscribers` once per date.
    ///
    /// Any request failure aborts the whole collection.
    #[instrument(skip_all, fields(subscribers = subscribers.len(), dates = window.dates().len()))]
    pub async fn collect(
        &self,
        subscribers: &[Subscriber],
        window: &DateWindow,
    ) -> Result<LocationResults, ApiError> {
        let keys: Vec<LocationKey> = subscribers
            .iter()
            .flat_map(Subscriber::location_keys)
            .unique()
            .collect();

        let mut results = LocationResults::default();
        for &date in window.dates() {
            info!(%date, locations = keys.len(), "Checking availability");

            let lookups: Vec<(LocationKey, SlotLookup)> = stream::iter(keys.iter().cloned())
                .map(|key| async move {
                    let centers = self.source.fetch(&key, date).await?;
                    let lookup = self.filter.extract(&centers);
                    debug!(
                        location = %key,
                        %date,
                        found = lookup.text().is_some(),
                        "Looked up location"
                    );
                    Ok::<_, ApiError>((key, lookup))
                })
                .buffered(self.concurrency)
                .try_collect()
                .await?;

            let scratch: BTreeMap<LocationKey, SlotLookup> = lookups.into_iter().collect();
            for (key, lookup) in scratch {
                results.record(key, lookup);
            }
        }

        info!(
            fetches = results.fetch_count(),
            with_slots = results.found_keys().count(),
            "Finished collecting availability"
        );
        Ok(results)
    }

    /// Builds one digest per subscriber that has at least one location with
    /// something to report. Subscriber order is preserved.
    pub fn distribute(
        subscribers: &[Subscriber],
        results: &LocationResults,
    ) -> Vec<SubscriberDigest> {
        subscribers
            .iter()
            .filter_map(|subscriber| {
                let content: String = subscriber
                    .location_keys()
                    .unique()
                    .filter_map(|key| results.text(&key).map(|text| location_section(&key, text)))
                    .collect();

                if content.is_empty() {
                    debug!(subscriber = %subscriber.name, "Nothing to report");
                    None
                } else {
                    Some(SubscriberDigest {
                        subscriber: subscriber.clone(),
                        content,
                    })
                }
            })
            .collect()
    }
}
