//! Core domain types and service traits for slotwatch
//!
//! This module defines the records that flow through a run (subscribers,
//! location keys, raw API records, digests) and the trait contracts that sit
//! between the aggregator and its network-facing collaborators.

use crate::api::ApiError;
use crate::utils::lenient;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Date format expected by the availability endpoints.
pub const API_DATE_FORMAT: &str = "%d-%m-%Y";

/// A person interested in slots at a set of locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Subscriber {
    /// Display name used in the email greeting.
    pub name: String,
    /// Email address the digest is sent to.
    pub email: String,
    /// Chat handle (Slack member id) mentioned in the chat message.
    pub slack: String,
    /// Postal codes to watch.
    #[serde(default, deserialize_with = "lenient::string_vec")]
    pub pincode: Vec<String>,
    /// District ids to watch.
    #[serde(default, deserialize_with = "lenient::string_vec")]
    pub district: Vec<String>,
}

impl Subscriber {
    /// The subscriber's location keys: postal codes first, then districts.
    pub fn location_keys(&self) -> impl Iterator<Item = LocationKey> + '_ {
        self.pincode
            .iter()
            .map(|p| LocationKey::Pincode(p.clone()))
            .chain(self.district.iter().map(|d| LocationKey::District(d.clone())))
    }
}

/// The unit of deduplicated lookup: a postal code or a district id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationKey {
    Pincode(String),
    District(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocationKeyError {
    #[error("either a pincode or a district id must be given")]
    Missing,
}

impl LocationKey {
    /// Builds a key from the loose two-argument form. The pincode wins when
    /// both are present.
    pub fn from_parts(
        district_id: Option<&str>,
        pincode: Option<&str>,
    ) -> Result<Self, LocationKeyError> {
        match (pincode, district_id) {
            (Some(p), _) if !p.is_empty() => Ok(LocationKey::Pincode(p.to_string())),
            (_, Some(d)) if !d.is_empty() => Ok(LocationKey::District(d.to_string())),
            _ => Err(LocationKeyError::Missing),
        }
    }

    /// `"pincode"` or `"district"`, as used in digest headers.
    pub fn kind(&self) -> &'static str {
        match self {
            LocationKey::Pincode(_) => "pincode",
            LocationKey::District(_) => "district",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LocationKey::Pincode(v) | LocationKey::District(v) => v,
        }
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.value())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("window date {index} at {step_days} days per step from {start} is out of range")]
    OutOfRange {
        start: NaiveDate,
        index: usize,
        step_days: i64,
    },
}

/// The calendar dates probed in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    dates: Vec<NaiveDate>,
}

impl DateWindow {
    /// `count` dates starting at `start`, `step_days` apart.
    ///
    /// Fails if any date would fall outside the representable calendar.
    pub fn stepped(start: NaiveDate, count: usize, step_days: i64) -> Result<Self, WindowError> {
        let dates = (0..count)
            .map(|index| {
                i64::try_from(index)
                    .ok()
                    .and_then(|i| step_days.checked_mul(i))
                    .and_then(TimeDelta::try_days)
                    .and_then(|offset| start.checked_add_signed(offset))
                    .ok_or(WindowError::OutOfRange {
                        start,
                        index,
                        step_days,
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { dates })
    }

    pub fn from_dates(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }
}

/// One vaccination center as returned by the calendar endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawCenter {
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub pincode: String,
    pub district_name: String,
    #[serde(default)]
    pub sessions: Vec<RawSession>,
    #[serde(default)]
    pub vaccine_fees: Option<Vec<VaccineFee>>,
}

/// One session within a center.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawSession {
    pub min_age_limit: u32,
    /// Zero or negative means nothing is bookable.
    #[serde(deserialize_with = "lenient::integer")]
    pub available_capacity: i64,
    pub vaccine: String,
    pub date: String,
}

/// A paid-vaccine fee entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VaccineFee {
    pub vaccine: String,
    #[serde(deserialize_with = "lenient::string")]
    pub fee: String,
}

/// Outcome of looking up one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotLookup {
    /// Rendered summary lines for the eligible sessions.
    Found(String),
    /// The location was fetched but nothing passed the filter.
    Empty,
    /// The location was never fetched.
    NotComputed,
}

impl SlotLookup {
    pub fn text(&self) -> Option<&str> {
        match self {
            SlotLookup::Found(text) => Some(text),
            SlotLookup::Empty | SlotLookup::NotComputed => None,
        }
    }
}

/// The consolidated content for one subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberDigest {
    pub subscriber: Subscriber,
    pub content: String,
}

// =============================================================================
// Service Traits
// =============================================================================

/// Retrieves the raw centers for a location on a date.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// # Returns
    /// * `Ok(centers)`, possibly empty
    /// * `Err` on transport failures or a response of the wrong shape
    async fn fetch(&self, key: &LocationKey, date: NaiveDate) -> Result<Vec<RawCenter>, ApiError>;
}

/// Delivers a digest to its subscriber.
#[async_trait]
pub trait Notify: Send + Sync {
    /// A short name for logging (e.g. "slack+email", "stdout").
    fn name(&self) -> &str;

    async fn notify(&self, digest: &SubscriberDigest) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_prefers_pincode() {
        let key = LocationKey::from_parts(Some("294"), Some("110001")).unwrap();
        assert_eq!(key, LocationKey::Pincode("110001".to_string()));
    }

    #[test]
    fn test_from_parts_falls_back_to_district() {
        let key = LocationKey::from_parts(Some("294"), None).unwrap();
        assert_eq!(key, LocationKey::District("294".to_string()));
        assert_eq!(key.to_string(), "district 294");
    }

    #[test]
    fn test_from_parts_requires_one() {
        assert_eq!(
            LocationKey::from_parts(None, None),
            Err(LocationKeyError::Missing)
        );
        assert_eq!(
            LocationKey::from_parts(Some(""), Some("")),
            Err(LocationKeyError::Missing)
        );
    }

    #[test]
    fn test_stepped_window() {
        let start = NaiveDate::from_ymd_opt(2021, 5, 10).unwrap();
        let window = DateWindow::stepped(start, 4, 7).unwrap();
        let rendered: Vec<String> = window
            .dates()
            .iter()
            .map(|d| d.format(API_DATE_FORMAT).to_string())
            .collect();
        assert_eq!(
            rendered,
            vec!["10-05-2021", "17-05-2021", "24-05-2021", "31-05-2021"]
        );
    }

    #[test]
    fn test_stepped_window_rejects_overflowing_step() {
        let start = NaiveDate::from_ymd_opt(2021, 5, 10).unwrap();

        let result = DateWindow::stepped(start, 2, i64::MAX / 1000);

        assert_eq!(
            result,
            Err(WindowError::OutOfRange {
                start,
                index: 1,
                step_days: i64::MAX / 1000,
            })
        );
    }

    #[test]
    fn test_stepped_window_rejects_multiplication_overflow() {
        let start = NaiveDate::from_ymd_opt(2021, 5, 10).unwrap();

        assert!(DateWindow::stepped(start, 3, i64::MAX).is_err());
    }

    #[test]
    fn test_stepped_window_with_zero_dates_is_empty() {
        let start = NaiveDate::from_ymd_opt(2021, 5, 10).unwrap();

        let window = DateWindow::stepped(start, 0, i64::MAX).unwrap();

        assert!(window.dates().is_empty());
    }

    #[test]
    fn test_subscriber_keys_pincodes_first() {
        let subscriber: Subscriber = serde_json::from_str(
            r#"{"name": "A", "email": "a@x.in", "slack": "U1", "pincode": [110001], "district": ["294"]}"#,
        )
        .unwrap();
        let keys: Vec<LocationKey> = subscriber.location_keys().collect();
        assert_eq!(
            keys,
            vec![
                LocationKey::Pincode("110001".to_string()),
                LocationKey::District("294".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_center_without_fees() {
        let center: RawCenter = serde_json::from_str(
            r#"{"name": "CenterA", "pincode": 110001, "district_name": "New Delhi",
                "sessions": [{"min_age_limit": 18, "available_capacity": 5, "vaccine": "X", "date": "10-05-2021"}]}"#,
        )
        .unwrap();
        assert_eq!(center.pincode, "110001");
        assert!(center.vaccine_fees.is_none());
        assert_eq!(center.sessions[0].available_capacity, 5);
    }
}
