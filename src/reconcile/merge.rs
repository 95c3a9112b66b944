//! Merging confirmed deltas into the persisted views.

use std::collections::HashSet;

use super::advancer::Delta;
use crate::config::SeriesConfig;
use crate::models::{PersistedViews, Snapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub advanced: usize,
    pub history_appended: usize,
    /// Deltas whose `(series, index)` was already in history.
    pub history_duplicates: usize,
    /// Entries dropped by the history cap.
    pub history_trimmed: usize,
}

/// Make sure every configured series has a counter and a snapshot slot.
/// In-memory only; a run that confirms nothing never writes this back.
pub fn normalize(views: &mut PersistedViews, series: &[SeriesConfig]) {
    for s in series {
        views.counters.entry(s.id.clone()).or_insert(0);
        views
            .latest
            .results
            .entry(s.id.clone())
            .or_insert_with(|| Snapshot::placeholder(&s.label));
    }
}

/// Apply every delta, stamp both timestamped views, re-sort history and
/// apply the optional cap.
///
/// History is append-only and keyed by `(type, draw)`: the dedupe set is
/// rebuilt from the loaded log, so a delta that re-confirms an already
/// recorded index (e.g. after an external counter reset) updates the counter
/// and snapshot but adds no second entry.
pub fn apply_deltas(
    views: &mut PersistedViews,
    deltas: &[Delta],
    stamp: &str,
    history_limit: Option<usize>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();
    if deltas.is_empty() {
        return summary;
    }

    let mut seen: HashSet<(String, u64)> = views.history.dedupe_keys();

    for delta in deltas {
        views
            .counters
            .insert(delta.series_id.clone(), delta.new_index);
        views
            .latest
            .results
            .insert(delta.series_id.clone(), delta.snapshot.clone());

        if seen.insert((delta.series_id.clone(), delta.new_index)) {
            views.history.items.push(delta.history_entry.clone());
            summary.history_appended += 1;
        } else {
            summary.history_duplicates += 1;
        }
        summary.advanced += 1;
    }

    views.latest.updated_at = stamp.to_string();
    views.history.updated_at = stamp.to_string();

    views.history.sort_most_recent_first();

    if let Some(limit) = history_limit {
        let before = views.history.items.len();
        views.history.truncate(limit);
        summary.history_trimmed = before - views.history.items.len();
    }

    summary
}
