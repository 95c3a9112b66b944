//! Schedule Gate
//!
//! Decides whether today (local calendar) is a day on which a series is
//! expected to publish. Only limits probing attempts; it never affects the
//! correctness of persisted state.

use chrono::{DateTime, Datelike, TimeZone, Weekday};
use std::collections::{HashMap, HashSet};

use crate::config::SeriesConfig;

/// Static series → weekdays table.
#[derive(Debug, Clone, Default)]
pub struct ScheduleGate {
    table: HashMap<String, HashSet<Weekday>>,
}

impl ScheduleGate {
    pub fn from_series(series: &[SeriesConfig]) -> Self {
        let table = series
            .iter()
            .map(|s| (s.id.clone(), s.weekdays.iter().copied().collect()))
            .collect();
        Self { table }
    }

    /// Unknown series are never eligible.
    pub fn is_eligible<Tz: TimeZone>(&self, series_id: &str, local: &DateTime<Tz>) -> bool {
        self.table
            .get(series_id)
            .map(|days| days.contains(&local.weekday()))
            .unwrap_or(false)
    }
}
