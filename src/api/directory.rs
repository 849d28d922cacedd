//! State and district lookups.

use super::{ApiError, CowinClient};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, instrument};

const STATES_PATH: &str = "/v2/admin/location/states";
const DISTRICTS_PATH: &str = "/v2/admin/location/districts";

#[derive(Deserialize)]
struct StatesResponse {
    states: Option<Vec<StateEntry>>,
}

#[derive(Deserialize)]
struct StateEntry {
    state_name: String,
    state_id: u32,
}

impl CowinClient {
    /// Returns a mapping of state name to state id.
    ///
    /// Fails with [`ApiError::UnexpectedShape`] when the body has no `states`
    /// key.
    #[instrument(skip(self))]
    pub async fn list_states(&self) -> Result<BTreeMap<String, u32>, ApiError> {
        let response: StatesResponse = self.get_json(STATES_PATH, &[]).await?;
        let states = response.states.ok_or_else(|| ApiError::UnexpectedShape {
            url: self.url(STATES_PATH),
            key: "states",
        })?;

        let mapping: BTreeMap<String, u32> = states
            .into_iter()
            .map(|entry| (entry.state_name, entry.state_id))
            .collect();
        info!(count = mapping.len(), "Fetched state directory");
        Ok(mapping)
    }

    /// Returns the district listing for a state, as sent by the API.
    #[instrument(skip(self))]
    pub async fn list_districts(&self, state_id: u32) -> Result<Value, ApiError> {
        let path = format!("{DISTRICTS_PATH}/{state_id}");
        self.get_json(&path, &[]).await
    }
}
