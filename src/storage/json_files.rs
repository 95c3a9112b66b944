//! JSON documents in a data directory: `state.json`, `latest.json`,
//! `history.json`.
//!
//! Saves are staged: all three documents are written to `*.json.tmp`
//! siblings first and renamed into place only after every write succeeded.
//! A failure while staging leaves the previous views untouched. A failed
//! rename removes the staged files that were not yet moved; documents renamed
//! before it stay replaced.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{StateStore, StoreError};
use crate::models::{Counters, HistoryLog, PersistedViews, SnapshotCollection};

pub const STATE_FILE: &str = "state.json";
pub const LATEST_FILE: &str = "latest.json";
pub const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<PersistedViews, StoreError> {
        let counters: Counters = load_json_or_default(&self.state_path())?;
        let latest: SnapshotCollection = load_json_or_default(&self.latest_path())?;
        let history: HistoryLog = load_json_or_default(&self.history_path())?;
        debug!(
            dir = %self.dir.display(),
            series = counters.len(),
            history_items = history.items.len(),
            "loaded persisted views"
        );
        Ok(PersistedViews {
            counters,
            latest,
            history,
        })
    }

    fn save(&self, views: &PersistedViews) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let documents = [
            (self.state_path(), to_pretty_json(&views.counters, &self.state_path())?),
            (self.latest_path(), to_pretty_json(&views.latest, &self.latest_path())?),
            (self.history_path(), to_pretty_json(&views.history, &self.history_path())?),
        ];

        let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(documents.len());
        for (path, body) in &documents {
            let temp_path = staging_path(path);
            if let Err(e) = write_file(&temp_path, body) {
                let _ = fs::remove_file(&temp_path);
                for (tmp, _) in &staged {
                    let _ = fs::remove_file(tmp);
                }
                return Err(e);
            }
            staged.push((temp_path, path.as_path()));
        }

        for (i, (temp_path, path)) in staged.iter().enumerate() {
            if let Err(source) = fs::rename(temp_path, path) {
                for (tmp, _) in &staged[i..] {
                    let _ = fs::remove_file(tmp);
                }
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        info!(dir = %self.dir.display(), "saved state, latest and history");
        Ok(())
    }
}

fn load_json_or_default<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn to_pretty_json<T: Serialize>(value: &T, path: &Path) -> Result<String, StoreError> {
    serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    writer.get_ref().sync_all().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryEntry, Snapshot};
    use tempfile::tempdir;

    fn sample_views() -> PersistedViews {
        let mut views = PersistedViews::default();
        views.counters.insert("zodiaco".into(), 10);
        views.latest.updated_at = "2026-10-11T18:00:00.000000Z".into();
        views.latest.results.insert(
            "zodiaco".into(),
            Snapshot::confirmed("Sorteo Zodíaco", 10, "2026-10-11", "https://example.invalid/z10.pdf"),
        );
        views.history.updated_at = views.latest.updated_at.clone();
        views.history.items.push(HistoryEntry {
            series_type: "zodiaco".into(),
            label: "Sorteo Zodíaco".into(),
            draw: 10,
            published_date: "2026-10-11".into(),
            pdf_url: "https://example.invalid/z10.pdf".into(),
        });
        views
    }

    #[test]
    fn test_missing_files_load_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        let views = store.load().unwrap();
        assert_eq!(views, PersistedViews::default());
    }

    #[test]
    fn test_save_writes_three_documents() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        let views = sample_views();
        store.save(&views).unwrap();

        let state = fs::read_to_string(store.state_path()).unwrap();
        assert_eq!(state, "{\n  \"zodiaco\": 10\n}");

        let history = fs::read_to_string(store.history_path()).unwrap();
        assert!(history.contains("\"type\": \"zodiaco\""));
        assert!(history.contains("\"pdf_url\""));
        // Non-ASCII stays verbatim
        assert!(history.contains("Sorteo Zodíaco"));

        assert_eq!(store.load().unwrap(), views);
    }

    #[test]
    fn test_save_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save(&sample_views()).unwrap();

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["history.json", "latest.json", "state.json"]);
    }

    #[test]
    fn test_failed_rename_removes_remaining_staging_files() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        // A non-empty directory in place of latest.json cannot be replaced
        fs::create_dir(store.latest_path()).unwrap();
        fs::write(store.latest_path().join("keep"), "").unwrap();

        let err = store.save(&sample_views()).unwrap_err();
        assert!(matches!(err, StoreError::Io { ref path, .. } if path.ends_with(LATEST_FILE)));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "staging files left behind: {:?}", leftovers);
    }

    #[test]
    fn test_corrupt_history_is_a_persistence_failure() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.history_path(), "{ not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Json { ref path, .. } if path.ends_with(HISTORY_FILE)));
    }

    #[test]
    fn test_string_draws_are_accepted() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(
            store.history_path(),
            r#"{"updated_at":"","items":[{"type":"mayor","label":"Sorteo Mayor","draw":"7","published_date":"2026-10-06","pdf_url":""}]}"#,
        )
        .unwrap();

        let views = store.load().unwrap();
        assert_eq!(views.history.items[0].draw, 7);
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("/data/state.json")),
            PathBuf::from("/data/state.json.tmp")
        );
    }
}
