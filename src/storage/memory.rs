//! In-process store. Used by tests and by callers that embed the engine
//! without a data directory.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{StateStore, StoreError};
use crate::models::PersistedViews;

#[derive(Debug, Default)]
pub struct MemoryStore {
    views: Mutex<PersistedViews>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new(views: PersistedViews) -> Self {
        Self {
            views: Mutex::new(views),
            saves: AtomicUsize::new(0),
        }
    }

    /// Copy of the currently stored views.
    pub fn views(&self) -> PersistedViews {
        self.views.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<PersistedViews, StoreError> {
        Ok(self.views.lock().clone())
    }

    fn save(&self, views: &PersistedViews) -> Result<(), StoreError> {
        *self.views.lock() = views.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_replaces_and_counts() {
        let store = MemoryStore::default();
        assert_eq!(store.save_count(), 0);

        let mut views = PersistedViews::default();
        views.counters.insert("mayor".into(), 5);
        store.save(&views).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap().counters.get("mayor"), Some(&5));
    }
}
