use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveStateDirError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

/// The directory holding the log collection, the session snapshot and the
/// log file. `KINTAI_STATE_DIR` overrides the default of `~/.kintai`.
pub fn resolve_state_dir() -> Result<PathBuf, ResolveStateDirError> {
    if let Some(dir) = std::env::var_os("KINTAI_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let Some(home) = dirs::home_dir() else {
        return Err(ResolveStateDirError::HomeDirNotFound);
    };
    Ok(home.join(".kintai"))
}
