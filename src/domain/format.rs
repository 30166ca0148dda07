use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const DISPLAY_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

const INPUT_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Millisecond duration as a zero-padded `HH:MM:SS` string. Negative values
/// clamp to zero.
pub fn format_duration(ms: i64) -> String {
    let ms = ms.max(0);
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `HH:MM:SS` string back to milliseconds. Malformed segments count as zero;
/// anything that is not exactly three colon-separated parts yields zero.
pub fn parse_duration(text: &str) -> i64 {
    let parts = text
        .split(':')
        .map(|part| part.trim().parse::<i64>().unwrap_or(0))
        .collect::<Vec<_>>();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return 0;
    };
    (hours * 3600 + minutes * 60 + seconds) * 1000
}

pub fn rfc3339_to_unix_ms(value: &str) -> Option<i64> {
    let timestamp = OffsetDateTime::parse(value, &Rfc3339).ok()?;
    let ms: i128 = timestamp.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).ok()
}

pub fn unix_ms_to_rfc3339(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_default()
}

/// RFC 3339 timestamp as a `YYYY/MM/DD HH:MM:SS` display string in the local
/// timezone. Unparseable input is passed through unchanged.
pub fn format_timestamp(value: &str) -> String {
    let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) else {
        return value.to_string();
    };
    timestamp
        .to_offset(local_offset())
        .format(&DISPLAY_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}

/// RFC 3339 timestamp as the edit-form string (`YYYY-MM-DDTHH:MM`, local
/// time, minute precision). Unparseable input yields an empty string.
pub fn format_datetime_local(value: &str) -> String {
    let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) else {
        return String::new();
    };
    timestamp
        .to_offset(local_offset())
        .format(&INPUT_FORMAT)
        .unwrap_or_default()
}

/// Edit-form string (`YYYY-MM-DDTHH:MM`, local time) back to unix
/// milliseconds.
pub fn parse_datetime_local(text: &str) -> Option<i64> {
    let parsed = PrimitiveDateTime::parse(text.trim(), &INPUT_FORMAT).ok()?;
    let timestamp = parsed.assume_offset(local_offset());
    let ms: i128 = timestamp.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).ok()
}

/// `YYYY-MM` key as a `<year>年<month>月` label, dropping the month's leading
/// zero. Empty or malformed input yields an empty string.
pub fn format_year_month(year_month: &str) -> String {
    let Some((year, month)) = year_month.split_once('-') else {
        return String::new();
    };
    let Ok(month) = month.parse::<u32>() else {
        return String::new();
    };
    format!("{year}年{month}月")
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations_zero_padded() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(61_000), "00:01:01");
        assert_eq!(format_duration(3_600_000 + 23 * 60_000 + 45_000), "01:23:45");
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        assert_eq!(format_duration(-5), "00:00:00");
    }

    #[test]
    fn duration_round_trips_at_second_precision() {
        for ms in [0i64, 1000, 59_000, 60_000, 3_599_000, 86_400_000, 360_000_000] {
            assert_eq!(parse_duration(&format_duration(ms)), ms);
        }
    }

    #[test]
    fn parse_duration_tolerates_malformed_segments() {
        assert_eq!(parse_duration("01:xx:30"), 3600 * 1000 + 30 * 1000);
        assert_eq!(parse_duration("::"), 0);
    }

    #[test]
    fn parse_duration_rejects_wrong_segment_count() {
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("10:00"), 0);
        assert_eq!(parse_duration("1:2:3:4"), 0);
    }

    #[test]
    fn rfc3339_conversion_round_trips() {
        let ms = rfc3339_to_unix_ms("2024-01-01T10:00:00Z").expect("parse");
        assert_eq!(unix_ms_to_rfc3339(ms), "2024-01-01T10:00:00Z");
    }

    #[test]
    fn format_timestamp_passes_garbage_through() {
        assert_eq!(format_timestamp("not a timestamp"), "not a timestamp");
    }

    #[test]
    fn datetime_local_round_trips() {
        let ms = rfc3339_to_unix_ms("2024-03-05T08:30:00Z").expect("parse");
        let text = format_datetime_local("2024-03-05T08:30:00Z");
        assert_eq!(parse_datetime_local(&text), Some(ms));
    }

    #[test]
    fn parse_datetime_local_rejects_garbage() {
        assert_eq!(parse_datetime_local(""), None);
        assert_eq!(parse_datetime_local("2024-13-40T99:99"), None);
    }

    #[test]
    fn formats_year_month_labels() {
        assert_eq!(format_year_month("2023-10"), "2023年10月");
        assert_eq!(format_year_month("2024-05"), "2024年5月");
        assert_eq!(format_year_month(""), "");
        assert_eq!(format_year_month("2023"), "");
        assert_eq!(format_year_month("2023-xx"), "");
    }
}
