//! Terminal UI rendering.
//!
//! Pure presentation: these functions read [`App`] state and draw it.
//! All behavior lives in `app` and `net`.

pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, AuthMode, BoardFocus, LoginField, Screen};
use crate::notify::NoticeLevel;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Main layout: content above, one notice line, status bar at bottom.
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    match app.screen {
        Screen::Login => render_login(frame, main_chunks[0], app),
        Screen::Board => render_board(frame, main_chunks[0], app),
    }

    render_notices(frame, main_chunks[1], app);
    status_bar::render(frame, main_chunks[2], app);
}

/// Render the login / registration form.
fn render_login(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.login.mode {
        Some(AuthMode::SignUp) => "Create account",
        _ => "Sign in",
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::FORM_TITLE)))
        .borders(Borders::ALL);

    let email_style = if app.login.focus == Some(LoginField::Email) {
        theme::highlighted()
    } else {
        theme::normal()
    };
    let password_style = if app.login.focus == Some(LoginField::Password) {
        theme::highlighted()
    } else {
        theme::normal()
    };
    let masked = "•".repeat(app.login.password.chars().count());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Email:    ", theme::dimmed()),
            Span::styled(app.login.email.clone(), email_style),
        ]),
        Line::from(vec![
            Span::styled("Password: ", theme::dimmed()),
            Span::styled(masked, password_style),
        ]),
    ];
    if let Some(ref error) = app.login.error {
        lines.push(Line::from(Span::styled(error.clone(), theme::error())));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the dashboard: task list beside the task form.
fn render_board(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    task_panel::render(frame, chunks[0], app);
    render_form(frame, chunks[1], app);
}

/// Render the create/edit form.
fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.editing.is_some() {
        "Edit task"
    } else {
        "New task"
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::FORM_TITLE)))
        .borders(Borders::ALL);

    let title_style = if app.focus == BoardFocus::Title {
        theme::highlighted()
    } else {
        theme::normal()
    };
    let description_style = if app.focus == BoardFocus::Description {
        theme::highlighted()
    } else {
        theme::normal()
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Title:       ", theme::dimmed()),
            Span::styled(app.title_input.clone(), title_style),
        ]),
        Line::from(vec![
            Span::styled("Description: ", theme::dimmed()),
            Span::styled(app.description_input.clone(), description_style),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the newest visible notice on a single line.
fn render_notices(frame: &mut Frame, area: Rect, app: &App) {
    let Some(active) = app.notices.notices().last() else {
        frame.render_widget(Paragraph::new(""), area);
        return;
    };
    let style = match active.notice.level {
        NoticeLevel::Info => theme::dimmed(),
        NoticeLevel::Success => theme::success(),
        NoticeLevel::Error => theme::error(),
    };
    let paragraph = Paragraph::new(Span::styled(active.notice.text.clone(), style));
    frame.render_widget(paragraph, area);
}
