mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppEvent, AppModel};
use crate::cli::CliInvocation;
use crate::domain::{WorkSession, WorkStatus, now_unix_ms};
use crate::infra::{
    LogStore, clear_snapshot, export_file_name, export_logs, init_logging, load_snapshot,
    resolve_state_dir, save_snapshot,
};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui => Ok(run_tui()?),
    }
}

fn print_help() {
    let text = format!(
        "{name} — terminal time clock\n\nUSAGE:\n  {name}              Start the TUI\n  {name} --help | --version\n\nKEYS:\n  Tab        Switch between the tracker and the history view\n  s/p/r/e    Start / pause / resume / end the work session\n  e, d, c    Edit / delete / clear records (history view)\n  m          Cycle the month filter (history view)\n  x          Export the filtered records to time_log_<month|all>.xlsx\n  q          Quit\n\nENV:\n  KINTAI_STATE_DIR  Override the state directory (default: ~/.kintai)\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui() -> Result<(), crate::app::AppError> {
    let state_dir = resolve_state_dir()?;
    let logging_notice = init_logging(&state_dir)
        .err()
        .map(|error| format!("ログファイルを開けません: {error}"));

    let store = LogStore::new(state_dir.clone());
    let mut session = WorkSession::new();
    if let Some(snapshot) = load_snapshot(&state_dir) {
        session.restore(&snapshot, now_unix_ms());
    }

    let mut model = AppModel::new(store.list(), session).with_notice(logging_notice);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut model, &store, &state_dir);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, crate::app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), crate::app::AppError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    store: &LogStore,
    state_dir: &Path,
) -> Result<(), crate::app::AppError> {
    // The display tick is armed only while a session is running; every other
    // transition disarms it.
    let mut tick_deadline = next_tick_deadline(model, None);

    loop {
        terminal.draw(|frame| ui::render(frame, model))?;

        let timeout = match tick_deadline {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(200)),
            None => Duration::from_millis(200),
        };

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    let (next, command) = app::update(model.clone(), AppEvent::Key(key));
                    *model = next;
                    if execute_command(model, command, store, state_dir) {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        if let Some(deadline) = tick_deadline {
            if Instant::now() >= deadline {
                let (next, _) = app::update(model.clone(), AppEvent::Tick);
                *model = next;
                tick_deadline = Some(deadline + TICK_INTERVAL);
            }
        }
        tick_deadline = next_tick_deadline(model, tick_deadline);
    }
}

fn next_tick_deadline(model: &AppModel, current: Option<Instant>) -> Option<Instant> {
    if model.session.status() == WorkStatus::Working {
        current.or_else(|| Some(Instant::now() + TICK_INTERVAL))
    } else {
        None
    }
}

/// Applies a command from `app::update` to the stores. Returns true when the
/// application should exit.
fn execute_command(
    model: &mut AppModel,
    command: AppCommand,
    store: &LogStore,
    state_dir: &Path,
) -> bool {
    match command {
        AppCommand::None => {}
        AppCommand::Quit => return true,
        AppCommand::PersistSnapshot => {
            let snapshot = model.session.snapshot();
            if let Err(error) = save_snapshot(state_dir, &snapshot) {
                log::warn!("failed to save session snapshot: {error}");
                model.notice = Some(format!("セッションの保存に失敗しました: {error}"));
            }
        }
        AppCommand::CommitLog(log) => {
            if let Err(error) = store.add(log) {
                log::warn!("failed to add time log: {error}");
                model.notice = Some(format!("記録の保存に失敗しました: {error}"));
            }
            if let Err(error) = clear_snapshot(state_dir) {
                log::warn!("failed to clear session snapshot: {error}");
            }
            model.logs = store.list();
        }
        AppCommand::ReplaceLog(log) => {
            if let Err(error) = store.update(log) {
                log::warn!("failed to update time log: {error}");
                model.notice = Some(format!("記録の更新に失敗しました: {error}"));
            }
            model.logs = store.list();
        }
        AppCommand::DeleteLog(id) => {
            if let Err(error) = store.delete(&id) {
                log::warn!("failed to delete time log {id}: {error}");
                model.notice = Some(format!("記録の削除に失敗しました: {error}"));
            }
            model.logs = store.list();
        }
        AppCommand::ClearLogs => {
            if let Err(error) = store.clear() {
                log::warn!("failed to clear time logs: {error}");
                model.notice = Some(format!("履歴の削除に失敗しました: {error}"));
            }
            model.logs = store.list();
        }
        AppCommand::Export { month } => {
            let file_name = export_file_name(month.as_deref());
            let rows = model
                .visible_logs()
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            match export_logs(Path::new(&file_name), &rows) {
                Ok(()) => {
                    model.notice = Some(format!("{file_name} に書き出しました"));
                }
                Err(error) => {
                    log::warn!("failed to export time logs: {error}");
                    model.notice = Some(format!("Excel出力に失敗しました: {error}"));
                }
            }
        }
    }
    false
}
