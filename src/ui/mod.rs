mod theme;

use crate::app::{AppModel, ConfirmDialog, EditDialog, EditField, View};
use crate::domain::{WorkStatus, format_duration, format_timestamp};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG).fg(theme::FG)),
        area,
    );

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, model, chunks[0]);
    match model.view {
        View::Tracker => render_tracker(frame, model, chunks[1]),
        View::History => render_history(frame, model, chunks[1]),
    }
    render_footer(frame, model, chunks[2]);

    if let Some(dialog) = &model.edit_dialog {
        render_edit_dialog(frame, dialog, area);
    }
    if let Some(confirm) = &model.confirm {
        render_confirm(frame, confirm, area);
    }
}

fn render_header(frame: &mut Frame, model: &AppModel, area: Rect) {
    let tab = |view: View| {
        let label = format!(" {} ", view.label());
        if view == model.view {
            Span::styled(
                label,
                Style::default()
                    .fg(theme::ACCENT)
                    .bg(theme::ACCENT_BG)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(theme::MUTED))
        }
    };

    let line = Line::from(vec![
        Span::styled(
            " kintai ",
            Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        tab(View::Tracker),
        Span::raw(" "),
        tab(View::History),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::BAR_BG)),
        area,
    );
}

fn render_tracker(frame: &mut Frame, model: &AppModel, area: Rect) {
    let status = model.session.status();
    let status_style = match status {
        WorkStatus::NotStarted => Style::default().fg(theme::MUTED),
        WorkStatus::Working => Style::default().fg(theme::ACCENT),
        WorkStatus::Paused => Style::default().fg(theme::WARN),
    };

    let hints = match status {
        WorkStatus::NotStarted => "s: 出勤",
        WorkStatus::Working => "p: 一時停止   e: 退勤",
        WorkStatus::Paused => "r: 再開   e: 退勤",
    };

    let lines = vec![
        Line::raw(""),
        Line::styled(status.label(), status_style),
        Line::raw(""),
        Line::styled(
            format_duration(model.session.elapsed_ms()),
            Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled(hints, Style::default().fg(theme::DIM)),
    ];

    let card = centered_rect(area, 40, 8);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .style(Style::default().bg(theme::SURFACE)),
        ),
        card,
    );
}

fn render_history(frame: &mut Frame, model: &AppModel, area: Rect) {
    let visible = model.visible_logs();
    let title = format!(" 稼働実績 — {} ", model.month_filter_label());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(title, Style::default().fg(theme::FG)));

    if visible.is_empty() {
        frame.render_widget(
            Paragraph::new("表示する記録がありません。")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme::DIM))
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(
        ["開始日時", "終了日時", "稼働時間", "休憩時間"]
            .iter()
            .map(|title| Cell::from(*title))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(theme::MUTED)
            .add_modifier(Modifier::BOLD),
    );

    let rows = visible
        .iter()
        .map(|log| {
            Row::new(vec![
                Cell::from(format_timestamp(&log.start_time)),
                Cell::from(format_timestamp(&log.end_time)),
                Cell::from(format_duration(log.duration)),
                Cell::from(format_duration(log.paused_duration)),
            ])
        })
        .collect::<Vec<_>>();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .fg(theme::ACCENT)
            .bg(theme::ACCENT_BG)
            .add_modifier(Modifier::BOLD),
    )
    .block(block);

    let mut state = TableState::default();
    state.select(Some(model.history_selected.min(visible.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame, model: &AppModel, area: Rect) {
    let line = if let Some(notice) = &model.notice {
        Line::styled(format!(" {notice}"), Style::default().fg(theme::WARN))
    } else {
        let hints = match model.view {
            View::Tracker => " Tab: 画面切替   q: 終了",
            View::History => {
                " Tab: 画面切替   ↑↓: 選択   e: 編集   d: 削除   c: 全削除   m: 月切替   x: Excel出力   q: 終了"
            }
        };
        Line::styled(hints, Style::default().fg(theme::DIM))
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::BAR_BG)),
        area,
    );
}

fn render_edit_dialog(frame: &mut Frame, dialog: &EditDialog, area: Rect) {
    let popup = centered_rect(area, 52, 11);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(Span::styled(
            " 実績の編集 ",
            Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme::SURFACE));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let fields = [EditField::StartTime, EditField::EndTime, EditField::PausedDuration];
    let mut lines = Vec::new();
    for field in fields {
        let editor = dialog.field(field);
        let focused = field == dialog.focus;
        let marker = if focused { "▸ " } else { "  " };
        let label_style = if focused {
            Style::default().fg(theme::ACCENT)
        } else {
            Style::default().fg(theme::MUTED)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}  ", field.label()), label_style),
            Span::styled(editor.text.clone(), Style::default().fg(theme::FG)),
        ]));
        lines.push(Line::raw(""));
    }

    if let Some(error) = &dialog.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(theme::ERROR)));
    } else {
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(
        "Enter: 保存   Tab: 次の項目   Esc: キャンセル",
        Style::default().fg(theme::DIM),
    ));

    frame.render_widget(Paragraph::new(lines), inner);

    // Terminal cursor inside the focused field.
    let focused_index = fields
        .iter()
        .position(|field| *field == dialog.focus)
        .unwrap_or(0);
    let editor = dialog.field(dialog.focus);
    let prefix_width = format!("▸ {}  ", dialog.focus.label()).width() as u16;
    let text_width = editor
        .text
        .chars()
        .take(editor.cursor)
        .collect::<String>()
        .width() as u16;
    let x = inner.x + prefix_width + text_width;
    let y = inner.y + (focused_index as u16) * 2;
    if x < inner.right() && y < inner.bottom() {
        frame.set_cursor_position((x, y));
    }
}

fn render_confirm(frame: &mut Frame, confirm: &ConfirmDialog, area: Rect) {
    let message = confirm.message();
    let width = (message.width() as u16 + 6).clamp(30, area.width);
    let popup = centered_rect(area, width, 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ERROR))
        .style(Style::default().bg(theme::SURFACE));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::styled(message, Style::default().fg(theme::FG)),
        Line::raw(""),
        Line::styled("y: はい   n: いいえ", Style::default().fg(theme::DIM)),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
