//! Series Advancer
//!
//! One series, one run: gate → candidate = last confirmed + 1 → location →
//! probe → delta. Only ever probes the immediate successor, so a series
//! moves by at most one index per run.

use tracing::{info, warn};

use crate::clock::RunInstant;
use crate::config::SeriesConfig;
use crate::models::{Counters, HistoryEntry, Snapshot};
use crate::probe::DocumentProber;
use crate::schedule::ScheduleGate;

/// A confirmed advance, not yet merged into the persisted views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub series_id: String,
    pub new_index: u64,
    pub snapshot: Snapshot,
    pub history_entry: HistoryEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Not a scheduled day, or the series cannot produce a location.
    Skipped,
    /// Probed; the next document is not (yet) there.
    Unchanged { current: u64, candidate: u64 },
    Advanced(Delta),
}

pub struct SeriesAdvancer<'a> {
    gate: &'a ScheduleGate,
    prober: &'a dyn DocumentProber,
}

impl<'a> SeriesAdvancer<'a> {
    pub fn new(gate: &'a ScheduleGate, prober: &'a dyn DocumentProber) -> Self {
        Self { gate, prober }
    }

    pub async fn advance(
        &self,
        series: &SeriesConfig,
        counters: &Counters,
        now: &RunInstant,
    ) -> AdvanceOutcome {
        if !self.gate.is_eligible(&series.id, &now.local) {
            return AdvanceOutcome::Skipped;
        }

        let current = counters.get(&series.id).copied().unwrap_or(0);
        let Some(candidate) = current.checked_add(1) else {
            warn!(series = %series.id, current, "index cannot advance any further, not probing");
            return AdvanceOutcome::Skipped;
        };

        let Some(location) = series.location(candidate) else {
            warn!(series = %series.id, template = %series.url_template, "no location for series, not probing");
            return AdvanceOutcome::Skipped;
        };

        info!(series = %series.id, candidate, url = %location, "probing next document");

        let outcome = self.prober.probe(&location).await;
        if !outcome.confirms_existence() {
            info!(
                series = %series.id,
                current,
                outcome = outcome.as_str(),
                "next document not published yet, keeping current index"
            );
            return AdvanceOutcome::Unchanged { current, candidate };
        }

        let published_date = now.local_date_iso();
        AdvanceOutcome::Advanced(Delta {
            series_id: series.id.clone(),
            new_index: candidate,
            snapshot: Snapshot::confirmed(&series.label, candidate, &published_date, &location),
            history_entry: HistoryEntry {
                series_type: series.id.clone(),
                label: series.label.clone(),
                draw: candidate,
                published_date,
                pdf_url: location,
            },
        })
    }
}
