//! Reconciliation Run
//!
//! load → normalize → advance every series in configured order → merge →
//! save. When no series advanced, nothing is written (timestamps included).

use chrono::FixedOffset;
use std::sync::Arc;
use tracing::info;

use super::advancer::{AdvanceOutcome, SeriesAdvancer};
use super::merge::{self, MergeSummary};
use crate::clock::{Clock, RunInstant};
use crate::config::{AppConfig, ConfigError, SeriesConfig};
use crate::probe::DocumentProber;
use crate::schedule::ScheduleGate;
use crate::storage::{StateStore, StoreError};

/// Where one series ended up in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesState {
    Skipped,
    Unchanged { current: u64, candidate: u64 },
    Advanced { from: u64, to: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesAttempt {
    pub series_id: String,
    pub state: SeriesState,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: String,
    pub attempts: Vec<SeriesAttempt>,
    pub advanced: usize,
    pub history_appended: usize,
    pub history_duplicates: usize,
    /// True only when the views were written.
    pub persisted: bool,
    pub dry_run: bool,
}

impl RunReport {
    pub fn state_of(&self, series_id: &str) -> Option<&SeriesState> {
        self.attempts
            .iter()
            .find(|a| a.series_id == series_id)
            .map(|a| &a.state)
    }

    pub fn probed(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| !matches!(a.state, SeriesState::Skipped))
            .count()
    }
}

pub struct Reconciler {
    series: Vec<SeriesConfig>,
    gate: ScheduleGate,
    offset: FixedOffset,
    history_limit: Option<usize>,
    prober: Arc<dyn DocumentProber>,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    dry_run: bool,
}

impl Reconciler {
    pub fn new(
        config: &AppConfig,
        prober: Arc<dyn DocumentProber>,
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self {
            series: config.series.clone(),
            gate: ScheduleGate::from_series(&config.series),
            offset: config.local_offset()?,
            history_limit: config.history_limit,
            prober,
            store,
            clock,
            dry_run: false,
        })
    }

    /// Probe and merge in memory, but never save.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<RunReport, StoreError> {
        let now = RunInstant::new(self.clock.now_utc(), self.offset);

        let mut views = self.store.load()?;
        merge::normalize(&mut views, &self.series);

        let advancer = SeriesAdvancer::new(&self.gate, self.prober.as_ref());
        let mut attempts = Vec::with_capacity(self.series.len());
        let mut deltas = Vec::new();

        for series in &self.series {
            let state = match advancer.advance(series, &views.counters, &now).await {
                AdvanceOutcome::Skipped => SeriesState::Skipped,
                AdvanceOutcome::Unchanged { current, candidate } => {
                    SeriesState::Unchanged { current, candidate }
                }
                AdvanceOutcome::Advanced(delta) => {
                    let from = delta.new_index - 1;
                    let to = delta.new_index;
                    info!(series = %series.id, from, to, url = %delta.snapshot.pdf_url, "document confirmed, advancing");
                    deltas.push(delta);
                    SeriesState::Advanced { from, to }
                }
            };
            attempts.push(SeriesAttempt {
                series_id: series.id.clone(),
                state,
            });
        }

        let mut report = RunReport {
            started_at: now.stamp(),
            attempts,
            advanced: 0,
            history_appended: 0,
            history_duplicates: 0,
            persisted: false,
            dry_run: self.dry_run,
        };

        if deltas.is_empty() {
            info!(probed = report.probed(), "no changes (no new documents published)");
            return Ok(report);
        }

        let MergeSummary {
            advanced,
            history_appended,
            history_duplicates,
            history_trimmed,
        } = merge::apply_deltas(&mut views, &deltas, &now.stamp(), self.history_limit);
        report.advanced = advanced;
        report.history_appended = history_appended;
        report.history_duplicates = history_duplicates;

        if self.dry_run {
            info!(advanced, history_appended, "dry run, changes not saved");
            return Ok(report);
        }

        self.store.save(&views)?;
        report.persisted = true;

        info!(
            advanced,
            history_appended,
            history_duplicates,
            history_trimmed,
            history_items = views.history.items.len(),
            "changes saved"
        );
        Ok(report)
    }
}
