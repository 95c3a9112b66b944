//! Run Clock
//!
//! Single source of "now" for a reconciliation run. The run reads the clock
//! once and derives both the UTC stamp and the local calendar date from it.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant (tests, replays).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Parse an RFC 3339 instant. Returns `None` on malformed input.
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self::new(dt.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.at
    }
}

/// The moment a run started, seen in UTC and in the configured local zone.
#[derive(Debug, Clone, Copy)]
pub struct RunInstant {
    pub utc: DateTime<Utc>,
    pub local: DateTime<FixedOffset>,
}

impl RunInstant {
    pub fn new(utc: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            utc,
            local: utc.with_timezone(&offset),
        }
    }

    /// Canonical UTC stamp, e.g. `2026-10-13T18:00:00.000000Z`.
    pub fn stamp(&self) -> String {
        self.utc.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn local_date(&self) -> NaiveDate {
        self.local.date_naive()
    }

    /// ISO calendar date in the local zone, e.g. `2026-10-13`.
    pub fn local_date_iso(&self) -> String {
        self.local_date().format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    #[test]
    fn test_local_date_crosses_midnight() {
        // 03:30 UTC Wednesday is still Tuesday evening at UTC-7.
        let clock = FixedClock::parse("2026-10-14T03:30:00Z").unwrap();
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let instant = RunInstant::new(clock.now_utc(), offset);

        assert_eq!(instant.local_date_iso(), "2026-10-13");
        assert_eq!(instant.local.weekday(), Weekday::Tue);
        assert_eq!(instant.utc.weekday(), Weekday::Wed);
    }

    #[test]
    fn test_stamp_is_utc_with_z_suffix() {
        let clock = FixedClock::parse("2026-10-13T11:00:00-07:00").unwrap();
        let instant = RunInstant::new(clock.now_utc(), FixedOffset::west_opt(7 * 3600).unwrap());
        assert_eq!(instant.stamp(), "2026-10-13T18:00:00.000000Z");
    }

    #[test]
    fn test_fixed_clock_rejects_garbage() {
        assert!(FixedClock::parse("yesterday").is_none());
    }
}
