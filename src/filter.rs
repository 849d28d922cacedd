//! Selects the sessions worth reporting and renders them as summary lines.

use crate::config::{AgeMatch, FilterConfig};
use crate::core::{RawCenter, RawSession, SlotLookup};
use std::fmt::Write;

/// Decides which sessions are available and renders one line per match.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotFilter {
    age: u32,
    age_match: AgeMatch,
    min_capacity: i64,
}

impl Default for SlotFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

impl SlotFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            age: config.age,
            age_match: config.age_match,
            min_capacity: config.min_capacity,
        }
    }

    /// Whether a single session passes the age and capacity rules.
    pub fn accepts(&self, session: &RawSession) -> bool {
        let age_ok = match self.age_match {
            AgeMatch::Exact => session.min_age_limit == self.age,
            AgeMatch::Eligible => session.min_age_limit <= self.age,
        };
        age_ok && session.available_capacity > self.min_capacity
    }

    /// Renders every accepted session across `centers`.
    ///
    /// # Returns
    /// * `SlotLookup::Found(text)` with one line per accepted session
    /// * `SlotLookup::Empty` when nothing passed
    pub fn extract(&self, centers: &[RawCenter]) -> SlotLookup {
        let lines: Vec<String> = centers
            .iter()
            .flat_map(|center| {
                center
                    .sessions
                    .iter()
                    .filter(move |session| self.accepts(session))
                    .map(move |session| render_line(center, session))
            })
            .collect();

        let text = lines.join("\n");
        let text = text.trim();
        if text.is_empty() {
            SlotLookup::Empty
        } else {
            SlotLookup::Found(text.to_string())
        }
    }
}

fn render_line(center: &RawCenter, session: &RawSession) -> String {
    let mut line = format!(
        "date={}\tcenter_name=>{}\tcenter_pincode=>{}\tvaccine=>{}\tavailable=>{}\tdistrict_name=>{}",
        session.date,
        center.name,
        center.pincode,
        session.vaccine,
        session.available_capacity,
        center.district_name
    );
    for fee in center.vaccine_fees.iter().flatten() {
        // Writing to a String cannot fail.
        let _ = write!(line, "\tvaccine_name=>{}\tfee=>{}\t", fee.vaccine, fee.fee);
    }
    line
}
