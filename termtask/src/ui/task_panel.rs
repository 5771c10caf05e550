//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::{App, BoardFocus, BoardState};

use super::theme;

/// Render the task panel: the list itself, or the loading/error state
/// that replaces it.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == BoardFocus::List;
    let border_style = if focused {
        theme::highlighted()
    } else {
        theme::normal()
    };
    let block = Block::default()
        .title(Span::styled("Tasks", theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(border_style);

    match &app.board_state {
        BoardState::Loading => {
            let paragraph = Paragraph::new(Span::styled("Loading…", theme::dimmed())).block(block);
            frame.render_widget(paragraph, area);
        }
        BoardState::Failed(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    format!("Could not load tasks: {message}"),
                    theme::error(),
                )),
                Line::from(Span::styled("Press r to retry", theme::dimmed())),
            ];
            let paragraph = Paragraph::new(lines).block(block);
            frame.render_widget(paragraph, area);
        }
        BoardState::Ready => {
            if app.tasks.is_empty() {
                let paragraph =
                    Paragraph::new(Span::styled("No tasks yet", theme::dimmed())).block(block);
                frame.render_widget(paragraph, area);
                return;
            }
            let items: Vec<ListItem> = app
                .tasks
                .iter()
                .enumerate()
                .map(|(index, task)| {
                    let checkbox = if task.is_completed { "[✓]" } else { "[ ]" };
                    let style = if index == app.selected && focused {
                        theme::selected()
                    } else if task.is_completed {
                        theme::dimmed()
                    } else {
                        theme::normal()
                    };
                    let stamp = task
                        .created_at
                        .with_timezone(&chrono::Local)
                        .format(&app.timestamp_format)
                        .to_string();
                    let mut spans = vec![
                        Span::styled(checkbox, style),
                        Span::raw(" "),
                        Span::styled(task.title.clone(), style),
                        Span::raw(" "),
                        Span::styled(stamp, theme::timestamp()),
                    ];
                    if let Some(ref description) = task.description {
                        spans.push(Span::raw(" "));
                        spans.push(Span::styled(format!("({description})"), theme::dimmed()));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();
            let list = List::new(items).block(block);
            frame.render_widget(list, area);
        }
    }
}
