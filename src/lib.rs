//! Draw Sheet Tracker Library
//!
//! Tracks sequentially numbered draw-result sheets per series and advances
//! each series only after probing that the next sheet exists.
//! The binary in main.rs performs exactly one reconciliation run.

pub mod clock;
pub mod config;
pub mod models;
pub mod probe;
pub mod reconcile;
pub mod schedule;
pub mod storage;

pub use clock::{Clock, FixedClock, RunInstant, SystemClock};
pub use config::{AppConfig, ConfigError, ConfigGap, ProbeConfig, SeriesConfig};
pub use probe::{DocumentProber, HttpProber, ProbeOutcome};
pub use reconcile::{Reconciler, RunReport, SeriesState};
pub use storage::{JsonFileStore, MemoryStore, StateStore, StoreError};
