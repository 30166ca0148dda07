use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    NotStarted,
    Working,
    Paused,
}

impl WorkStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "スタンバイ",
            Self::Working => "稼働中",
            Self::Paused => "一時停止中",
        }
    }
}

/// One completed work session. Timestamps are RFC 3339 strings, durations are
/// milliseconds. `duration` is always `end - start - paused_duration`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: i64,
    pub paused_duration: i64,
}

impl TimeLog {
    /// The `YYYY-MM` prefix of the start timestamp, used for month filtering.
    /// Stored timestamps can hold arbitrary text, so the cut must not assume
    /// ASCII.
    pub fn year_month(&self) -> &str {
        self.start_time.get(..7).unwrap_or(&self.start_time)
    }
}
