use crate::domain::{TimeLog, format_duration, format_timestamp};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportLogsError {
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// `time_log_<YYYY-MM|all>.xlsx`, matching the month filter in effect.
pub fn export_file_name(month: Option<&str>) -> String {
    format!("time_log_{}.xlsx", month.unwrap_or("all"))
}

/// Writes the given (already filtered) logs as a spreadsheet: one header row
/// and one row per record, all values display-formatted.
pub fn export_logs(path: &Path, logs: &[TimeLog]) -> Result<(), ExportLogsError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("稼働実績")?;
    worksheet.set_column_width(0, 20)?;
    worksheet.set_column_width(1, 20)?;
    worksheet.set_column_width(2, 15)?;
    worksheet.set_column_width(3, 15)?;

    let header = Format::new().set_bold();
    for (col, title) in ["開始日時", "終了日時", "稼働時間", "休憩時間"]
        .iter()
        .enumerate()
    {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (index, log) in logs.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, format_timestamp(&log.start_time))?;
        worksheet.write_string(row, 1, format_timestamp(&log.end_time))?;
        worksheet.write_string(row, 2, format_duration(log.duration))?;
        worksheet.write_string(row, 3, format_duration(log.paused_duration))?;
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn names_export_after_month_filter() {
        assert_eq!(export_file_name(None), "time_log_all.xlsx");
        assert_eq!(export_file_name(Some("2023-10")), "time_log_2023-10.xlsx");
    }

    #[test]
    fn writes_a_workbook_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("time_log_all.xlsx");
        let logs = vec![TimeLog {
            id: "a".to_string(),
            start_time: "2024-01-01T09:00:00Z".to_string(),
            end_time: "2024-01-01T10:00:00Z".to_string(),
            duration: 3_300_000,
            paused_duration: 300_000,
        }];

        export_logs(&path, &logs).expect("export");
        let metadata = std::fs::metadata(&path).expect("metadata");
        assert!(metadata.len() > 0);
    }
}
