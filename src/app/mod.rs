mod field_editor;

use crate::domain::{
    TimeLog, WorkSession, WorkStatus, format_datetime_local, format_duration, format_year_month,
    now_unix_ms, parse_datetime_local, parse_duration, unix_ms_to_rfc3339,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

pub use field_editor::FieldEditor;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ResolveStateDir(#[from] crate::infra::ResolveStateDirError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum View {
    Tracker,
    History,
}

impl View {
    pub fn toggle(self) -> Self {
        match self {
            Self::Tracker => Self::History,
            Self::History => Self::Tracker,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tracker => "タイムトラッカー",
            Self::History => "稼働実績",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditField {
    StartTime,
    EndTime,
    PausedDuration,
}

impl EditField {
    pub fn label(self) -> &'static str {
        match self {
            Self::StartTime => "開始日時",
            Self::EndTime => "終了日時",
            Self::PausedDuration => "休憩時間",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::StartTime => Self::EndTime,
            Self::EndTime => Self::PausedDuration,
            Self::PausedDuration => Self::StartTime,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::StartTime => Self::PausedDuration,
            Self::EndTime => Self::StartTime,
            Self::PausedDuration => Self::EndTime,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EditDialog {
    pub log_id: String,
    pub start_time: FieldEditor,
    pub end_time: FieldEditor,
    pub paused_duration: FieldEditor,
    pub focus: EditField,
    pub error: Option<String>,
}

impl EditDialog {
    pub fn for_log(log: &TimeLog) -> Self {
        Self {
            log_id: log.id.clone(),
            start_time: FieldEditor::from_text(format_datetime_local(&log.start_time)),
            end_time: FieldEditor::from_text(format_datetime_local(&log.end_time)),
            paused_duration: FieldEditor::from_text(format_duration(log.paused_duration)),
            focus: EditField::StartTime,
            error: None,
        }
    }

    pub fn field(&self, field: EditField) -> &FieldEditor {
        match field {
            EditField::StartTime => &self.start_time,
            EditField::EndTime => &self.end_time,
            EditField::PausedDuration => &self.paused_duration,
        }
    }

    fn focused_mut(&mut self) -> &mut FieldEditor {
        match self.focus {
            EditField::StartTime => &mut self.start_time,
            EditField::EndTime => &mut self.end_time,
            EditField::PausedDuration => &mut self.paused_duration,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfirmDialog {
    DeleteLog { id: String },
    ClearLogs,
}

impl ConfirmDialog {
    pub fn message(&self) -> &'static str {
        match self {
            Self::DeleteLog { .. } => "この記録を削除しますか？",
            Self::ClearLogs => "本当にすべての履歴を削除しますか？この操作は取り消せません。",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub logs: Vec<TimeLog>,
    pub session: WorkSession,
    pub view: View,
    pub history_selected: usize,
    /// `None` means all months; otherwise a `YYYY-MM` key.
    pub month_filter: Option<String>,
    pub edit_dialog: Option<EditDialog>,
    pub confirm: Option<ConfirmDialog>,
    pub notice: Option<String>,
}

impl AppModel {
    pub fn new(logs: Vec<TimeLog>, session: WorkSession) -> Self {
        Self {
            logs,
            session,
            view: View::Tracker,
            history_selected: 0,
            month_filter: None,
            edit_dialog: None,
            confirm: None,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// Distinct `YYYY-MM` keys of the stored logs, most recent first (the
    /// logs themselves are sorted descending).
    pub fn month_choices(&self) -> Vec<String> {
        let mut months: Vec<String> = Vec::new();
        for log in &self.logs {
            let month = log.year_month().to_string();
            if !months.contains(&month) {
                months.push(month);
            }
        }
        months
    }

    pub fn visible_logs(&self) -> Vec<&TimeLog> {
        match &self.month_filter {
            None => self.logs.iter().collect(),
            Some(month) => self
                .logs
                .iter()
                .filter(|log| log.start_time.starts_with(month.as_str()))
                .collect(),
        }
    }

    pub fn selected_log(&self) -> Option<&TimeLog> {
        self.visible_logs().get(self.history_selected).copied()
    }

    pub fn month_filter_label(&self) -> String {
        match &self.month_filter {
            None => "すべての月".to_string(),
            Some(month) => format_year_month(month),
        }
    }

    fn cycle_month_filter(&mut self) {
        let choices = self.month_choices();
        self.month_filter = match &self.month_filter {
            None => choices.first().cloned(),
            Some(current) => match choices.iter().position(|month| month == current) {
                Some(index) => choices.get(index + 1).cloned(),
                None => None,
            },
        };
        self.history_selected = 0;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_logs().len();
        if len == 0 {
            self.history_selected = 0;
        } else {
            self.history_selected = self.history_selected.min(len - 1);
        }
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

/// Side effects requested by `update`, executed by the main loop against the
/// infra layer.
#[derive(Clone, Debug, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    PersistSnapshot,
    CommitLog(TimeLog),
    ReplaceLog(TimeLog),
    DeleteLog(String),
    ClearLogs,
    Export { month: Option<String> },
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    match event {
        AppEvent::Tick => {
            model.session.tick(now_unix_ms());
            (model, AppCommand::None)
        }
        AppEvent::Key(key) => handle_key(model, key),
    }
}

fn handle_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return (model, AppCommand::Quit);
    }
    if model.edit_dialog.is_some() {
        return handle_edit_key(model, key);
    }
    if model.confirm.is_some() {
        return handle_confirm_key(model, key);
    }

    match key.code {
        KeyCode::Char('q') => return (model, AppCommand::Quit),
        KeyCode::Tab => {
            model.view = model.view.toggle();
            model.notice = None;
            model.clamp_selection();
            return (model, AppCommand::None);
        }
        _ => {}
    }

    match model.view {
        View::Tracker => handle_tracker_key(model, key),
        View::History => handle_history_key(model, key),
    }
}

fn handle_tracker_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let now_ms = now_unix_ms();
    match key.code {
        KeyCode::Char('s') if model.session.status() == WorkStatus::NotStarted => {
            model.session.start(now_ms);
            (model, AppCommand::PersistSnapshot)
        }
        KeyCode::Char('p') if model.session.status() == WorkStatus::Working => {
            model.session.pause(now_ms);
            (model, AppCommand::PersistSnapshot)
        }
        KeyCode::Char('r') if model.session.status() == WorkStatus::Paused => {
            model.session.resume(now_ms);
            (model, AppCommand::PersistSnapshot)
        }
        KeyCode::Char('e') => match model.session.end(now_ms) {
            Some(log) => (model, AppCommand::CommitLog(log)),
            None => (model, AppCommand::None),
        },
        _ => (model, AppCommand::None),
    }
}

fn handle_history_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            model.history_selected = model.history_selected.saturating_sub(1);
            (model, AppCommand::None)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            model.history_selected += 1;
            model.clamp_selection();
            (model, AppCommand::None)
        }
        KeyCode::Char('m') => {
            model.cycle_month_filter();
            (model, AppCommand::None)
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            if let Some(log) = model.selected_log() {
                model.edit_dialog = Some(EditDialog::for_log(log));
            }
            (model, AppCommand::None)
        }
        KeyCode::Char('d') => {
            if let Some(log) = model.selected_log() {
                model.confirm = Some(ConfirmDialog::DeleteLog { id: log.id.clone() });
            }
            (model, AppCommand::None)
        }
        KeyCode::Char('c') => {
            if !model.logs.is_empty() {
                model.confirm = Some(ConfirmDialog::ClearLogs);
            }
            (model, AppCommand::None)
        }
        KeyCode::Char('x') => {
            if model.visible_logs().is_empty() {
                return (model, AppCommand::None);
            }
            let month = model.month_filter.clone();
            (model, AppCommand::Export { month })
        }
        _ => (model, AppCommand::None),
    }
}

fn handle_edit_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(mut dialog) = model.edit_dialog.take() else {
        return (model, AppCommand::None);
    };

    match key.code {
        KeyCode::Esc => (model, AppCommand::None),
        KeyCode::Tab | KeyCode::Down => {
            dialog.focus = dialog.focus.next();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::BackTab | KeyCode::Up => {
            dialog.focus = dialog.focus.prev();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::Enter => {
            let Some(original) = model.logs.iter().find(|log| log.id == dialog.log_id) else {
                // The record disappeared under the dialog; just close it.
                return (model, AppCommand::None);
            };
            match validated_log(
                original,
                &dialog.start_time.text,
                &dialog.end_time.text,
                &dialog.paused_duration.text,
            ) {
                Ok(edited) => (model, AppCommand::ReplaceLog(edited)),
                Err(message) => {
                    dialog.error = Some(message);
                    model.edit_dialog = Some(dialog);
                    (model, AppCommand::None)
                }
            }
        }
        KeyCode::Left => {
            dialog.focused_mut().move_left();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::Right => {
            dialog.focused_mut().move_right();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::Home => {
            dialog.focused_mut().move_home();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::End => {
            dialog.focused_mut().move_end();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::Backspace => {
            dialog.focused_mut().backspace();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::Delete => {
            dialog.focused_mut().delete_forward();
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        KeyCode::Char(ch) => {
            dialog.focused_mut().insert_char(ch);
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
        _ => {
            model.edit_dialog = Some(dialog);
            (model, AppCommand::None)
        }
    }
}

fn handle_confirm_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(confirm) = model.confirm.take() else {
        return (model, AppCommand::None);
    };

    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => match confirm {
            ConfirmDialog::DeleteLog { id } => (model, AppCommand::DeleteLog(id)),
            ConfirmDialog::ClearLogs => {
                model.month_filter = None;
                model.history_selected = 0;
                (model, AppCommand::ClearLogs)
            }
        },
        _ => (model, AppCommand::None),
    }
}

/// Re-derives a record from the edit form. Rejects (with a user-facing
/// message, leaving the store untouched) when the timestamps do not parse,
/// when end is not after start, or when the paused time exceeds the span.
fn validated_log(
    original: &TimeLog,
    start_text: &str,
    end_text: &str,
    paused_text: &str,
) -> Result<TimeLog, String> {
    let Some(start_ms) = parse_datetime_local(start_text) else {
        return Err("日時の形式が正しくありません。".to_string());
    };
    let Some(end_ms) = parse_datetime_local(end_text) else {
        return Err("日時の形式が正しくありません。".to_string());
    };
    if start_ms >= end_ms {
        return Err("終了日時は開始日時より後に設定してください。".to_string());
    }

    let paused_duration = parse_duration(paused_text);
    let duration = end_ms - start_ms - paused_duration;
    if duration < 0 {
        return Err("稼働時間がマイナスになっています。休憩時間を確認してください。".to_string());
    }

    Ok(TimeLog {
        id: original.id.clone(),
        start_time: unix_ms_to_rfc3339(start_ms),
        end_time: unix_ms_to_rfc3339(end_ms),
        duration,
        paused_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ch: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
    }

    fn sample_log(id: &str, start: &str) -> TimeLog {
        TimeLog {
            id: id.to_string(),
            start_time: start.to_string(),
            end_time: start.replace("T09", "T10"),
            duration: 3_600_000,
            paused_duration: 0,
        }
    }

    #[test]
    fn start_key_begins_a_session_and_persists_the_snapshot() {
        let model = AppModel::new(Vec::new(), WorkSession::new());
        let (next, command) = update(model, key('s'));
        assert_eq!(next.session.status(), WorkStatus::Working);
        assert_eq!(command, AppCommand::PersistSnapshot);
    }

    #[test]
    fn pause_key_outside_working_does_nothing() {
        let model = AppModel::new(Vec::new(), WorkSession::new());
        let (next, command) = update(model, key('p'));
        assert_eq!(next.session.status(), WorkStatus::NotStarted);
        assert_eq!(command, AppCommand::None);
    }

    #[test]
    fn end_key_commits_a_log() {
        let mut session = WorkSession::new();
        session.start(now_unix_ms());
        let model = AppModel::new(Vec::new(), session);

        let (next, command) = update(model, key('e'));
        assert_eq!(next.session.status(), WorkStatus::NotStarted);
        let AppCommand::CommitLog(log) = command else {
            panic!("expected CommitLog, got {command:?}");
        };
        assert_eq!(log.paused_duration, 0);
        assert!(log.duration >= 0);
    }

    #[test]
    fn month_filter_cycles_through_choices_and_back_to_all() {
        let mut model = AppModel::new(
            vec![
                sample_log("b", "2024-02-01T09:00:00Z"),
                sample_log("a", "2024-01-01T09:00:00Z"),
            ],
            WorkSession::new(),
        );

        model.cycle_month_filter();
        assert_eq!(model.month_filter.as_deref(), Some("2024-02"));
        model.cycle_month_filter();
        assert_eq!(model.month_filter.as_deref(), Some("2024-01"));
        model.cycle_month_filter();
        assert_eq!(model.month_filter, None);
    }

    #[test]
    fn month_filter_narrows_visible_logs() {
        let mut model = AppModel::new(
            vec![
                sample_log("b", "2024-02-01T09:00:00Z"),
                sample_log("a", "2024-01-01T09:00:00Z"),
            ],
            WorkSession::new(),
        );
        model.month_filter = Some("2024-01".to_string());
        let visible = model.visible_logs();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "a");
    }

    #[test]
    fn edit_rejects_end_before_start() {
        let original = sample_log("a", "2024-01-01T09:00:00Z");
        let result = validated_log(
            &original,
            "2024-01-01T10:00",
            "2024-01-01T09:00",
            "00:00:00",
        );
        assert!(result.is_err());
    }

    #[test]
    fn edit_rejects_paused_time_exceeding_span() {
        let original = sample_log("a", "2024-01-01T09:00:00Z");
        let result = validated_log(
            &original,
            "2024-01-01T09:00",
            "2024-01-01T10:00",
            "02:00:00",
        );
        assert!(result.is_err());
    }

    #[test]
    fn edit_rederives_duration_from_the_form() {
        let original = sample_log("a", "2024-01-01T09:00:00Z");
        let edited = validated_log(
            &original,
            "2024-01-01T09:00",
            "2024-01-01T11:00",
            "00:30:00",
        )
        .expect("valid edit");

        assert_eq!(edited.id, "a");
        assert_eq!(edited.paused_duration, 1_800_000);
        assert_eq!(edited.duration, 2 * 3_600_000 - 1_800_000);
    }

    #[test]
    fn rejected_edit_issues_no_command_and_keeps_the_dialog() {
        let log = sample_log("a", "2024-01-01T09:00:00Z");
        let mut model = AppModel::new(vec![log.clone()], WorkSession::new());
        let mut dialog = EditDialog::for_log(&log);
        dialog.start_time = FieldEditor::from_text("2024-01-01T10:00".to_string());
        dialog.end_time = FieldEditor::from_text("2024-01-01T09:00".to_string());
        model.edit_dialog = Some(dialog);

        let (next, command) = update(
            model,
            AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
        );
        assert_eq!(command, AppCommand::None);
        let dialog = next.edit_dialog.expect("dialog stays open");
        assert!(dialog.error.is_some());
    }

    #[test]
    fn confirm_is_required_before_delete() {
        let log = sample_log("a", "2024-01-01T09:00:00Z");
        let model = AppModel::new(vec![log], WorkSession::new());
        let mut model = model;
        model.view = View::History;

        let (next, command) = update(model, key('d'));
        assert_eq!(command, AppCommand::None);
        assert_eq!(
            next.confirm,
            Some(ConfirmDialog::DeleteLog { id: "a".to_string() })
        );

        let (next, command) = update(next, key('y'));
        assert_eq!(command, AppCommand::DeleteLog("a".to_string()));
        assert_eq!(next.confirm, None);
    }

    #[test]
    fn declining_a_confirm_does_nothing() {
        let log = sample_log("a", "2024-01-01T09:00:00Z");
        let mut model = AppModel::new(vec![log], WorkSession::new());
        model.view = View::History;
        model.confirm = Some(ConfirmDialog::ClearLogs);

        let (next, command) = update(model, key('n'));
        assert_eq!(command, AppCommand::None);
        assert_eq!(next.confirm, None);
        assert_eq!(next.logs.len(), 1);
    }

    #[test]
    fn export_uses_the_active_month_filter() {
        let mut model = AppModel::new(
            vec![sample_log("a", "2024-01-01T09:00:00Z")],
            WorkSession::new(),
        );
        model.view = View::History;
        model.month_filter = Some("2024-01".to_string());

        let (_, command) = update(model, key('x'));
        assert_eq!(
            command,
            AppCommand::Export {
                month: Some("2024-01".to_string())
            }
        );
    }
}
