use crate::domain::{TimeLog, rfc3339_to_unix_ms};
use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveTimeLogsError {
    #[error("failed to encode time logs: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write time logs: {0}")]
    Write(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ClearTimeLogsError {
    #[error("failed to remove time logs: {0}")]
    Remove(#[from] io::Error),
}

/// Persistence for the completed-session history: one JSON array of TimeLog
/// objects, rewritten whole on every change. There is exactly one writer (the
/// UI thread), so last-write-wins is fine.
#[derive(Clone, Debug)]
pub struct LogStore {
    state_dir: PathBuf,
}

impl LogStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    fn logs_path(&self) -> PathBuf {
        self.state_dir.join("time_logs.json")
    }

    /// All records, sorted by start timestamp descending. Never errors: a
    /// missing file is an empty history, and corrupt storage is logged and
    /// treated as empty.
    pub fn list(&self) -> Vec<TimeLog> {
        let path = self.logs_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                log::warn!("failed to read time logs from {}: {error}", path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<TimeLog>>(&raw) {
            Ok(mut logs) => {
                sort_by_start_desc(&mut logs);
                logs
            }
            Err(error) => {
                log::warn!("failed to parse time logs from {}: {error}", path.display());
                Vec::new()
            }
        }
    }

    pub fn add(&self, log: TimeLog) -> Result<(), SaveTimeLogsError> {
        let mut logs = self.list();
        logs.push(log);
        sort_by_start_desc(&mut logs);
        self.save(&logs)
    }

    /// Replaces the record with a matching id. An unknown id is a silent
    /// no-op; nothing is rewritten.
    pub fn update(&self, log: TimeLog) -> Result<(), SaveTimeLogsError> {
        let mut logs = self.list();
        let Some(slot) = logs.iter_mut().find(|existing| existing.id == log.id) else {
            return Ok(());
        };
        *slot = log;
        sort_by_start_desc(&mut logs);
        self.save(&logs)
    }

    pub fn delete(&self, id: &str) -> Result<(), SaveTimeLogsError> {
        let mut logs = self.list();
        logs.retain(|log| log.id != id);
        self.save(&logs)
    }

    pub fn clear(&self) -> Result<(), ClearTimeLogsError> {
        match fs::remove_file(self.logs_path()) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, logs: &[TimeLog]) -> Result<(), SaveTimeLogsError> {
        fs::create_dir_all(&self.state_dir)?;
        let path = self.logs_path();
        let tmp = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(logs)?;
        fs::write(&tmp, text)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

fn sort_by_start_desc(logs: &mut [TimeLog]) {
    // Stable, so records with equal start timestamps keep their order.
    logs.sort_by_key(|log| Reverse(rfc3339_to_unix_ms(&log.start_time).unwrap_or(0)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn log(id: &str, start: &str, end: &str) -> TimeLog {
        TimeLog {
            id: id.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            duration: 3_600_000,
            paused_duration: 0,
        }
    }

    #[test]
    fn lists_logs_sorted_by_start_descending() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        store
            .add(log("a", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"))
            .expect("add");
        store
            .add(log("b", "2024-01-03T09:00:00Z", "2024-01-03T10:00:00Z"))
            .expect("add");
        store
            .add(log("c", "2024-01-02T09:00:00Z", "2024-01-02T10:00:00Z"))
            .expect("add");

        let ids = store.list().iter().map(|l| l.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn add_then_delete_restores_prior_collection() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        store
            .add(log("keep", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"))
            .expect("add");
        let before = store.list();

        store
            .add(log("gone", "2024-02-01T09:00:00Z", "2024-02-01T10:00:00Z"))
            .expect("add");
        store.delete("gone").expect("delete");

        assert_eq!(store.list(), before);
    }

    #[test]
    fn update_replaces_matching_record() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        store
            .add(log("a", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"))
            .expect("add");
        let mut edited = log("a", "2024-01-01T09:00:00Z", "2024-01-01T11:00:00Z");
        edited.duration = 7_200_000;
        store.update(edited.clone()).expect("update");

        assert_eq!(store.list(), vec![edited]);
    }

    #[test]
    fn update_with_unknown_id_leaves_collection_unchanged() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        store
            .add(log("a", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"))
            .expect("add");
        let before = store.list();

        store
            .update(log("missing", "2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z"))
            .expect("update");

        assert_eq!(store.list(), before);
    }

    #[test]
    fn corrupt_storage_reads_as_empty() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        fs::write(dir.path().join("time_logs.json"), "{not json").expect("write");
        assert!(store.list().is_empty());
    }

    #[test]
    fn clear_removes_everything_and_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        store
            .add(log("a", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"))
            .expect("add");
        store.clear().expect("clear");
        assert!(store.list().is_empty());
        store.clear().expect("clear again");
    }

    #[test]
    fn persists_camel_case_field_names() {
        let dir = tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().to_path_buf());

        store
            .add(log("a", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"))
            .expect("add");

        let raw = fs::read_to_string(dir.path().join("time_logs.json")).expect("read");
        for key in ["\"id\"", "\"startTime\"", "\"endTime\"", "\"duration\"", "\"pausedDuration\""] {
            assert!(raw.contains(key), "missing {key} in {raw}");
        }
    }
}
