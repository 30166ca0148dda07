use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Error)]
pub enum InitLoggingError {
    #[error("failed to open log file: {0}")]
    Open(#[from] io::Error),

    #[error("failed to install logger: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Installs a file logger under the state dir. The TUI owns the terminal, so
/// everything goes to `kintai.log`.
pub fn init_logging(state_dir: &Path) -> Result<(), InitLoggingError> {
    fs::create_dir_all(state_dir)?;
    fern::Dispatch::new()
        .format(|out, message, record| {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default();
            out.finish(format_args!(
                "{timestamp} [{}] {}: {message}",
                record.level(),
                record.target()
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(fern::log_file(state_dir.join("kintai.log"))?)
        .apply()?;
    Ok(())
}
