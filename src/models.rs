//! Persisted views
//!
//! The three records a reconciliation run loads, mutates in memory and saves:
//! per-series counters, the latest snapshot per series and the history log.
//! Field names match the on-disk JSON documents.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Highest confirmed index per series id.
pub type Counters = BTreeMap<String, u64>;

/// Display form of a confirmed draw index ("Sorteo 6").
pub fn draw_display(index: u64) -> String {
    format!("Sorteo {}", index)
}

/// Latest confirmed document for one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub draw: String,
    #[serde(default)]
    pub published_date: String,
    #[serde(default)]
    pub pdf_url: String,
}

impl Snapshot {
    /// Empty entry for a series that has never been confirmed.
    pub fn placeholder(label: &str) -> Self {
        Self {
            label: label.to_string(),
            draw: String::new(),
            published_date: String::new(),
            pdf_url: String::new(),
        }
    }

    pub fn confirmed(label: &str, index: u64, published_date: &str, pdf_url: &str) -> Self {
        Self {
            label: label.to_string(),
            draw: draw_display(index),
            published_date: published_date.to_string(),
            pdf_url: pdf_url.to_string(),
        }
    }
}

/// `latest.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCollection {
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub results: BTreeMap<String, Snapshot>,
}

/// One confirmed document. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub series_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(deserialize_with = "de_draw_index")]
    pub draw: u64,
    #[serde(default)]
    pub published_date: String,
    #[serde(default)]
    pub pdf_url: String,
}

impl HistoryEntry {
    pub fn dedupe_key(&self) -> (String, u64) {
        (self.series_type.clone(), self.draw)
    }
}

// Hand-edited history files sometimes carry the draw as a string ("12").
fn de_draw_index<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("draw out of range: {}", n))),
        Value::String(s) => s.trim().parse::<u64>().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "draw must be an integer, got {}",
            other
        ))),
    }
}

/// `history.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub items: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// `(type, draw)` pairs already recorded.
    pub fn dedupe_keys(&self) -> HashSet<(String, u64)> {
        self.items.iter().map(HistoryEntry::dedupe_key).collect()
    }

    /// Most recent first: descending by `(published_date, draw)`.
    ///
    /// Stable, so entries with identical keys keep their relative order.
    pub fn sort_most_recent_first(&mut self) {
        self.items.sort_by(|a, b| {
            (b.published_date.as_str(), b.draw).cmp(&(a.published_date.as_str(), a.draw))
        });
    }

    /// Keep only the first `limit` entries. Call after sorting.
    pub fn truncate(&mut self, limit: usize) {
        self.items.truncate(limit);
    }

    pub fn count_of(&self, series_type: &str, draw: u64) -> usize {
        self.items
            .iter()
            .filter(|it| it.series_type == series_type && it.draw == draw)
            .count()
    }
}

/// Everything one run owns between load and save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedViews {
    pub counters: Counters,
    pub latest: SnapshotCollection,
    pub history: HistoryLog,
}
