//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, BoardFocus, Screen};

use super::theme;

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.screen {
        Screen::Login => "Enter: submit | Tab: switch field | F2: toggle sign-up | Ctrl-C: quit",
        Screen::Board => match app.focus {
            BoardFocus::List => {
                "Space: toggle | e: edit | d: delete | r: refresh | l: logout | Tab: form | q: quit"
            }
            BoardFocus::Title | BoardFocus::Description => {
                "Enter: save | Esc: cancel | Tab: next field"
            }
        },
    };

    let identity = app.user_email.as_deref().map_or_else(
        || "not signed in".to_string(),
        |email| format!("signed in as {email}"),
    );

    let status_line = Line::from(vec![
        Span::styled("TermTask v0.1.0", theme::bold()),
        Span::raw(" | "),
        Span::raw(identity),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
