//! Persistence Adapter
//!
//! Load/save of the three persisted views as one unit. Absent records load
//! as their empty shape so the first run bootstraps them.

pub mod json_files;
pub mod memory;

pub use json_files::JsonFileStore;
pub use memory::MemoryStore;

use std::fmt;
use std::path::PathBuf;

use crate::models::PersistedViews;

pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<PersistedViews, StoreError>;

    /// Persist all three views. Only called when at least one series
    /// advanced.
    fn save(&self, views: &PersistedViews) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            Self::Json { path, source } => {
                write!(f, "JSON error in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}
