//! Incremental-probe reconciliation engine
//!
//! Per series, per run:
//! `Idle → ScheduleCheck → {Skipped | Probing} → {Unchanged | Advanced}`.
//! Nothing survives between runs except the persisted counter.

pub mod advancer;
pub mod merge;
pub mod run;

pub use advancer::{AdvanceOutcome, Delta, SeriesAdvancer};
pub use merge::{apply_deltas, normalize, MergeSummary};
pub use run::{Reconciler, RunReport, SeriesAttempt, SeriesState};
