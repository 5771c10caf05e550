//! Application state and event handling for the TUI.
//!
//! `App` is pure state plus key handling: key events produce
//! [`AppAction`]s for the main loop to dispatch, and [`NetEvent`]s from
//! the networking layer are folded back in via
//! [`App::apply_event`]. No networking happens here.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use termtask_proto::task::{Task, TaskId, TaskPatch};

use crate::net::{NetCommand, NetEvent};
use crate::notify::{NoticeCenter, NoticeLevel};
use crate::session::SessionState;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// The login / registration form.
    Login,
    /// The task dashboard.
    Board,
}

/// Whether the login form submits as sign-in or sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Authenticate an existing account.
    SignIn,
    /// Create a new account.
    SignUp,
}

/// Focused field on the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    /// The email input.
    Email,
    /// The password input.
    Password,
}

/// Focused element on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFocus {
    /// The task list (default).
    List,
    /// The title input of the task form.
    Title,
    /// The description input of the task form.
    Description,
}

/// Load state of the board as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardState {
    /// A fetch is pending.
    Loading,
    /// The list is current.
    Ready,
    /// The last fetch failed; `r` retries.
    Failed(String),
}

/// What the main loop should do after a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Nothing to dispatch.
    None,
    /// Send this command to the networking layer.
    Command(NetCommand),
    /// Tear down and exit.
    Quit,
}

/// Login form state.
#[derive(Debug, Default)]
pub struct LoginForm {
    /// Email input contents.
    pub email: String,
    /// Password input contents.
    pub password: String,
    /// Focused field.
    pub focus: Option<LoginField>,
    /// Submit mode.
    pub mode: Option<AuthMode>,
    /// Last auth failure, shown under the form.
    pub error: Option<String>,
}

/// Main application state.
pub struct App {
    /// Which screen is showing.
    pub screen: Screen,
    /// Login form state.
    pub login: LoginForm,
    /// Email of the signed-in user, for the status bar.
    pub user_email: Option<String>,

    /// Tasks as last reported by the networking layer, newest-first.
    pub tasks: Vec<Task>,
    /// Selected row in the task list.
    pub selected: usize,
    /// Board load state.
    pub board_state: BoardState,
    /// Focused element on the board.
    pub focus: BoardFocus,

    /// Title input contents.
    pub title_input: String,
    /// Description input contents.
    pub description_input: String,
    /// Task being edited, if the form is in edit mode.
    pub editing: Option<TaskId>,
    /// Set while a form submit is in flight, so only a confirmed
    /// submit clears the form.
    submit_pending: bool,

    /// Visible notices.
    pub notices: NoticeCenter,
    /// Timestamp display format string (chrono).
    pub timestamp_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates the app on the login screen, waiting for the session
    /// check.
    #[must_use]
    pub fn new(notices: NoticeCenter) -> Self {
        Self {
            screen: Screen::Login,
            login: LoginForm {
                focus: Some(LoginField::Email),
                mode: Some(AuthMode::SignIn),
                ..Default::default()
            },
            user_email: None,
            tasks: Vec::new(),
            selected: 0,
            board_state: BoardState::Loading,
            focus: BoardFocus::List,
            title_input: String::new(),
            description_input: String::new(),
            editing: None,
            submit_pending: false,
            notices,
            timestamp_format: "%b %e %H:%M".to_string(),
            should_quit: false,
        }
    }

    /// Sets the timestamp display format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: &str) -> Self {
        self.timestamp_format = format.to_string();
        self
    }

    /// The currently selected task, if any.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    /// Fold a networking event into the state.
    pub fn apply_event(&mut self, event: NetEvent, now: Instant) {
        match event {
            NetEvent::SessionChecked(SessionState::Ready(user)) => {
                self.user_email = Some(user.email);
                self.screen = Screen::Board;
                self.board_state = BoardState::Loading;
            }
            NetEvent::SessionChecked(SessionState::Absent | SessionState::Pending) => {
                self.screen = Screen::Login;
            }
            NetEvent::SignedIn(user) => {
                self.user_email = Some(user.email);
                self.login = LoginForm {
                    focus: Some(LoginField::Email),
                    mode: Some(AuthMode::SignIn),
                    ..Default::default()
                };
                self.screen = Screen::Board;
                self.board_state = BoardState::Loading;
            }
            NetEvent::AuthFailed(message) => {
                self.login.error = Some(message);
            }
            NetEvent::TasksLoaded(tasks) => {
                self.tasks = tasks;
                self.board_state = BoardState::Ready;
                self.clamp_selection();
                if self.submit_pending {
                    // Only a confirmed submit clears the form; a failed
                    // one keeps it populated for retry.
                    self.clear_form();
                }
            }
            NetEvent::LoadFailed(message) => {
                self.board_state = BoardState::Failed(message);
                self.submit_pending = false;
            }
            NetEvent::Notice(notice) => {
                if notice.level == NoticeLevel::Error {
                    self.submit_pending = false;
                }
                self.notices.push(notice, now);
            }
            NetEvent::RedirectToLogin => {
                self.tasks.clear();
                self.user_email = None;
                self.clear_form();
                self.screen = Screen::Login;
            }
        }
    }

    /// Periodic tick: expire notices.
    pub fn tick(&mut self, now: Instant) {
        self.notices.prune(now);
    }

    /// Handle a key event, producing an action for the main loop.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return AppAction::Quit;
        }
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Board => self.handle_board_key(key),
        }
    }

    // -- Login screen ------------------------------------------------------

    fn handle_login_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.login.focus = Some(match self.login.focus {
                    Some(LoginField::Email) => LoginField::Password,
                    _ => LoginField::Email,
                });
                AppAction::None
            }
            KeyCode::F(2) => {
                self.login.mode = Some(match self.login.mode {
                    Some(AuthMode::SignIn) => AuthMode::SignUp,
                    _ => AuthMode::SignIn,
                });
                AppAction::None
            }
            KeyCode::Enter => self.submit_login(),
            KeyCode::Backspace => {
                match self.login.focus {
                    Some(LoginField::Email) => {
                        self.login.email.pop();
                    }
                    _ => {
                        self.login.password.pop();
                    }
                }
                AppAction::None
            }
            KeyCode::Char(c) => {
                match self.login.focus {
                    Some(LoginField::Email) => self.login.email.push(c),
                    _ => self.login.password.push(c),
                }
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    fn submit_login(&mut self) -> AppAction {
        if self.login.email.trim().is_empty() || self.login.password.is_empty() {
            self.login.error = Some("Email and password are required".to_string());
            return AppAction::None;
        }
        self.login.error = None;
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        let command = match self.login.mode {
            Some(AuthMode::SignUp) => NetCommand::SignUp { email, password },
            _ => NetCommand::SignIn { email, password },
        };
        AppAction::Command(command)
    }

    // -- Board screen ------------------------------------------------------

    fn handle_board_key(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            self.cycle_focus();
            return AppAction::None;
        }
        match self.focus {
            BoardFocus::List => self.handle_list_key(key),
            BoardFocus::Title | BoardFocus::Description => self.handle_form_key(key),
        }
    }

    const fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            BoardFocus::List => BoardFocus::Title,
            BoardFocus::Title => BoardFocus::Description,
            BoardFocus::Description => BoardFocus::List,
        };
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                AppAction::Quit
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
                AppAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
                AppAction::None
            }
            KeyCode::Char(' ') => self
                .selected_task()
                .map_or(AppAction::None, |t| AppAction::Command(NetCommand::Toggle(t.id))),
            KeyCode::Char('d') => self
                .selected_task()
                .map_or(AppAction::None, |t| AppAction::Command(NetCommand::Delete(t.id))),
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task().cloned() {
                    self.editing = Some(task.id);
                    self.title_input = task.title.clone();
                    self.description_input = task.description.clone().unwrap_or_default();
                    self.focus = BoardFocus::Title;
                }
                AppAction::None
            }
            KeyCode::Char('r') => AppAction::Command(NetCommand::Refresh),
            KeyCode::Char('l') => AppAction::Command(NetCommand::Logout),
            _ => AppAction::None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter => self.submit_form(),
            KeyCode::Esc => {
                self.clear_form();
                self.focus = BoardFocus::List;
                AppAction::None
            }
            KeyCode::Backspace => {
                match self.focus {
                    BoardFocus::Description => {
                        self.description_input.pop();
                    }
                    _ => {
                        self.title_input.pop();
                    }
                }
                AppAction::None
            }
            KeyCode::Char(c) => {
                match self.focus {
                    BoardFocus::Description => self.description_input.push(c),
                    _ => self.title_input.push(c),
                }
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    fn submit_form(&mut self) -> AppAction {
        if self.title_input.trim().is_empty() {
            return AppAction::None;
        }
        self.submit_pending = true;
        let description = Some(self.description_input.clone()).filter(|d| !d.trim().is_empty());
        let command = if let Some(id) = self.editing {
            NetCommand::Update {
                id,
                patch: TaskPatch {
                    title: Some(self.title_input.clone()),
                    description,
                    is_completed: None,
                },
            }
        } else {
            NetCommand::Create {
                title: self.title_input.clone(),
                description,
            }
        };
        AppAction::Command(command)
    }

    fn clear_form(&mut self) {
        self.title_input.clear();
        self.description_input.clear();
        self.editing = None;
        self.submit_pending = false;
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.tasks.len() {
            self.selected = self.tasks.len().saturating_sub(1);
        }
    }
}
