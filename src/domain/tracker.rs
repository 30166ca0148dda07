use crate::domain::{TimeLog, WorkStatus, unix_ms_to_rfc3339};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serialized in-progress session state, persisted so a restart while a
/// session is active can pick up where it left off. Timestamps are unix
/// milliseconds; `pause_time` is only present while paused.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: WorkStatus,
    pub start_time: Option<i64>,
    pub pause_time: Option<i64>,
    pub paused_duration: i64,
}

/// The work-session state machine: NOT_STARTED → WORKING ⇄ PAUSED →
/// NOT_STARTED. Transitions called in the wrong state are silent no-ops.
/// All methods take the current wall-clock time so the machine itself stays
/// deterministic and testable.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkSession {
    status: WorkStatus,
    start_ms: Option<i64>,
    pause_ms: Option<i64>,
    paused_ms: i64,
    elapsed_ms: i64,
}

impl WorkSession {
    pub fn new() -> Self {
        Self {
            status: WorkStatus::NotStarted,
            start_ms: None,
            pause_ms: None,
            paused_ms: 0,
            elapsed_ms: 0,
        }
    }

    pub fn status(&self) -> WorkStatus {
        self.status
    }

    /// Worked milliseconds as last displayed. Frozen while paused; refreshed
    /// by `tick` once a second while working and on every transition.
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms
    }

    pub fn start(&mut self, now_ms: i64) {
        if self.status != WorkStatus::NotStarted {
            return;
        }
        self.status = WorkStatus::Working;
        self.start_ms = Some(now_ms);
        self.pause_ms = None;
        self.paused_ms = 0;
        self.elapsed_ms = 0;
    }

    pub fn pause(&mut self, now_ms: i64) {
        if self.status != WorkStatus::Working {
            return;
        }
        self.status = WorkStatus::Paused;
        self.pause_ms = Some(now_ms);
        self.recompute_elapsed(now_ms);
    }

    pub fn resume(&mut self, now_ms: i64) {
        if self.status != WorkStatus::Paused {
            return;
        }
        if let Some(pause_ms) = self.pause_ms.take() {
            self.paused_ms += now_ms - pause_ms;
        }
        self.status = WorkStatus::Working;
        self.recompute_elapsed(now_ms);
    }

    /// Ends the session and returns the completed record. A live pause is
    /// folded into the paused total first. Returns `None` when no session is
    /// in progress.
    pub fn end(&mut self, now_ms: i64) -> Option<TimeLog> {
        if self.status == WorkStatus::NotStarted {
            return None;
        }
        let Some(start_ms) = self.start_ms else {
            *self = Self::new();
            return None;
        };

        let mut paused_ms = self.paused_ms;
        if self.status == WorkStatus::Paused {
            if let Some(pause_ms) = self.pause_ms {
                paused_ms += now_ms - pause_ms;
            }
        }
        let duration = (now_ms - start_ms) - paused_ms;

        *self = Self::new();
        Some(TimeLog {
            id: Uuid::new_v4().to_string(),
            start_time: unix_ms_to_rfc3339(start_ms),
            end_time: unix_ms_to_rfc3339(now_ms),
            duration,
            paused_duration: paused_ms,
        })
    }

    /// The one-second display refresh. Only meaningful while working; the
    /// display stays frozen in any other state.
    pub fn tick(&mut self, now_ms: i64) {
        if self.status != WorkStatus::Working {
            return;
        }
        self.recompute_elapsed(now_ms);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            start_time: self.start_ms,
            pause_time: self.pause_ms,
            paused_duration: self.paused_ms,
        }
    }

    /// Restores a persisted snapshot verbatim and recomputes the display
    /// once. A paused session shows the elapsed time as of the pause moment.
    pub fn restore(&mut self, snapshot: &SessionSnapshot, now_ms: i64) {
        self.status = snapshot.status;
        self.start_ms = snapshot.start_time;
        self.pause_ms = snapshot.pause_time;
        self.paused_ms = snapshot.paused_duration;
        self.elapsed_ms = 0;
        match self.status {
            WorkStatus::NotStarted => {}
            WorkStatus::Working => self.recompute_elapsed(now_ms),
            WorkStatus::Paused => {
                let at = self.pause_ms.unwrap_or(now_ms);
                self.recompute_elapsed(at);
            }
        }
    }

    fn recompute_elapsed(&mut self, now_ms: i64) {
        if let Some(start_ms) = self.start_ms {
            self.elapsed_ms = now_ms - start_ms - self.paused_ms;
        }
    }
}

impl Default for WorkSession {
    fn default() -> Self {
        Self::new()
    }
}
