//! Calendar lookups by postal code or district.

use super::{ApiError, CowinClient};
use crate::core::{AvailabilitySource, LocationKey, RawCenter, API_DATE_FORMAT};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, instrument};

const BY_PIN_PATH: &str = "/v2/appointment/sessions/public/calendarByPin";
const BY_DISTRICT_PATH: &str = "/v2/appointment/sessions/public/calendarByDistrict";

/// Body of both calendar endpoints. A missing `centers` key means none.
#[derive(Debug, Deserialize)]
pub struct CalendarResponse {
    #[serde(default)]
    pub centers: Vec<RawCenter>,
}

impl CowinClient {
    /// Fetches the centers for `key`, starting at `date` (today when `None`).
    #[instrument(skip(self), fields(location = %key))]
    pub async fn calendar(
        &self,
        key: &LocationKey,
        date: Option<NaiveDate>,
    ) -> Result<Vec<RawCenter>, ApiError> {
        let date = date
            .unwrap_or_else(|| Local::now().date_naive())
            .format(API_DATE_FORMAT)
            .to_string();

        let (path, param) = match key {
            LocationKey::Pincode(_) => (BY_PIN_PATH, "pincode"),
            LocationKey::District(_) => (BY_DISTRICT_PATH, "district_id"),
        };

        let response: CalendarResponse = self
            .get_json(path, &[(param, key.value()), ("date", date.as_str())])
            .await?;
        debug!(centers = response.centers.len(), "Fetched calendar");
        Ok(response.centers)
    }
}

#[async_trait]
impl AvailabilitySource for CowinClient {
    async fn fetch(&self, key: &LocationKey, date: NaiveDate) -> Result<Vec<RawCenter>, ApiError> {
        self.calendar(key, Some(date)).await
    }
}
