use crate::domain::SessionSnapshot;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveSnapshotError {
    #[error("failed to encode session snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write session snapshot: {0}")]
    Write(#[from] io::Error),
}

fn snapshot_path(state_dir: &Path) -> PathBuf {
    state_dir.join("session.json")
}

/// Loads the in-progress session snapshot, if any. A malformed snapshot is
/// logged, deleted and treated as absent, leaving the tracker at NOT_STARTED.
pub fn load_snapshot(state_dir: &Path) -> Option<SessionSnapshot> {
    let path = snapshot_path(state_dir);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
        Err(error) => {
            log::warn!("failed to read session snapshot from {}: {error}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(error) => {
            log::warn!("discarding malformed session snapshot at {}: {error}", path.display());
            let _ = fs::remove_file(&path);
            None
        }
    }
}

pub fn save_snapshot(state_dir: &Path, snapshot: &SessionSnapshot) -> Result<(), SaveSnapshotError> {
    fs::create_dir_all(state_dir)?;
    let path = snapshot_path(state_dir);
    let tmp = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(snapshot)?;
    fs::write(&tmp, text)?;
    fs::rename(tmp, path)?;
    Ok(())
}

pub fn clear_snapshot(state_dir: &Path) -> io::Result<()> {
    match fs::remove_file(snapshot_path(state_dir)) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkStatus;
    use tempfile::tempdir;

    #[test]
    fn round_trips_snapshot() {
        let dir = tempdir().expect("tempdir");
        let snapshot = SessionSnapshot {
            status: WorkStatus::Paused,
            start_time: Some(1_000),
            pause_time: Some(5_000),
            paused_duration: 250,
        };

        save_snapshot(dir.path(), &snapshot).expect("save");
        assert_eq!(load_snapshot(dir.path()), Some(snapshot));
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(load_snapshot(dir.path()), None);
    }

    #[test]
    fn malformed_snapshot_is_discarded() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{\"status\": 42").expect("write");

        assert_eq!(load_snapshot(dir.path()), None);
        assert!(!path.exists());
    }

    #[test]
    fn clear_tolerates_missing_file() {
        let dir = tempdir().expect("tempdir");
        clear_snapshot(dir.path()).expect("clear");

        let snapshot = SessionSnapshot {
            status: WorkStatus::Working,
            start_time: Some(1_000),
            pause_time: None,
            paused_duration: 0,
        };
        save_snapshot(dir.path(), &snapshot).expect("save");
        clear_snapshot(dir.path()).expect("clear");
        assert_eq!(load_snapshot(dir.path()), None);
    }
}
