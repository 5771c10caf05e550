//! Networking coordinator for wiring the TUI to the async client stack.
//!
//! This module bridges the synchronous TUI event loop (crossterm
//! poll-based) with the async [`Dashboard`] / [`AuthFlow`] stack. It
//! spawns background tokio tasks and communicates with the main thread
//! via [`NetCommand`] / [`NetEvent`] channels.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── NetEvent ───  tokio background tasks
//!                     ─── NetCommand →
//! ```
//!
//! The command handler processes one command at a time, which is what
//! serializes the client's request issuance: overlapping mutations
//! cannot run concurrently with each other from a single UI.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use termtask_proto::auth::SessionUser;
use termtask_proto::task::{Task, TaskId, TaskPatch};

use crate::auth::{AuthFlow, SubmitOutcome};
use crate::cache::TaskCache;
use crate::dashboard::{Dashboard, LoadState, Nav};
use crate::notify::Notice;
use crate::session::http::{HttpSessionProvider, build_client};
use crate::session::{SessionProvider, SessionState};
use crate::store::TaskStore;
use crate::store::http::HttpTaskStore;

/// Commands sent from the TUI main loop to the networking tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetCommand {
    /// Re-check the current session state.
    CheckSession,
    /// Submit the login form.
    SignIn {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Submit the registration form.
    SignUp {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Force-fetch the task list (also the retry action).
    Refresh,
    /// Create a task from form input.
    Create {
        /// Raw title input.
        title: String,
        /// Raw description input, if any.
        description: Option<String>,
    },
    /// Apply a partial update to a task.
    Update {
        /// Target task.
        id: TaskId,
        /// Fields to change.
        patch: TaskPatch,
    },
    /// Flip a task's completion state.
    Toggle(TaskId),
    /// Permanently delete a task.
    Delete(TaskId),
    /// End the session and leave the dashboard.
    Logout,
    /// Gracefully shut down the networking tasks.
    Shutdown,
}

/// Events sent from the networking tasks to the TUI main loop.
#[derive(Debug)]
pub enum NetEvent {
    /// The session check resolved.
    SessionChecked(SessionState),
    /// Sign-in or sign-up succeeded.
    SignedIn(SessionUser),
    /// Sign-in or sign-up failed; the message is already user-safe.
    AuthFailed(String),
    /// The task list was (re)loaded; also the success signal after a
    /// mutation, carrying the updated list.
    TasksLoaded(Vec<Task>),
    /// A fetch failed retryably; feeds the inline banner.
    LoadFailed(String),
    /// A user-visible notification.
    Notice(Notice),
    /// The session is gone; the UI must return to the login view.
    RedirectToLogin,
}

/// Default channel capacity for commands and events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default buffer for the dashboard notice channel.
const DEFAULT_NOTICE_BUFFER: usize = 64;

/// Configuration for the networking layer.
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Base URL of the task service (trailing slash).
    pub api_base: Url,
    /// Validity window of the task list cache.
    pub cache_ttl: Duration,
    /// Channel capacity for command/event mpsc channels.
    pub channel_capacity: usize,
    /// Buffer size for the dashboard notice channel.
    pub notice_buffer: usize,
}

impl NetConfig {
    /// Creates a `NetConfig` with default channel capacities.
    #[must_use]
    pub const fn new(api_base: Url, cache_ttl: Duration) -> Self {
        Self {
            api_base,
            cache_ttl,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            notice_buffer: DEFAULT_NOTICE_BUFFER,
        }
    }
}

/// Errors that can occur while starting the networking layer.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The HTTP client could not be constructed.
    #[error("failed to set up networking: {0}")]
    Setup(String),
}

/// Spawn the networking background tasks and return channel handles.
///
/// Builds one cookie-store HTTP client shared by the identity provider
/// and the task store (the session cookie and bearer requests ride the
/// same stack, as they would in a browser), then spawns:
///
/// 1. A **command handler** that owns the [`Dashboard`] and [`AuthFlow`]
///    and processes [`NetCommand`]s one at a time.
/// 2. A **notice forwarder** that maps dashboard [`Notice`]s to
///    [`NetEvent::Notice`].
///
/// An initial session check is issued automatically, so the UI receives
/// a [`NetEvent::SessionChecked`] without asking.
///
/// # Errors
///
/// Returns [`NetError`] if the HTTP client cannot be built.
pub async fn spawn_net(
    config: NetConfig,
) -> Result<(mpsc::Sender<NetCommand>, mpsc::Receiver<NetEvent>), NetError> {
    let http = build_client().map_err(|e| NetError::Setup(e.to_string()))?;
    let provider = Arc::new(HttpSessionProvider::new(http.clone(), config.api_base.clone()));
    let store = HttpTaskStore::new(http, config.api_base.clone());
    let cache = TaskCache::new(config.cache_ttl);

    let (dashboard, notice_rx) =
        Dashboard::new(Arc::clone(&provider), store, cache, config.notice_buffer);
    let auth = AuthFlow::new(Arc::clone(&provider));

    let (cmd_tx, cmd_rx) = mpsc::channel::<NetCommand>(config.channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<NetEvent>(config.channel_capacity);

    // Kick off the initial session check before any user input.
    let _ = cmd_tx.send(NetCommand::CheckSession).await;

    let cmd_evt_tx = evt_tx.clone();
    tokio::spawn(async move {
        command_handler(dashboard, auth, provider, cmd_rx, cmd_evt_tx).await;
    });

    tokio::spawn(async move {
        notice_forwarder(notice_rx, evt_tx).await;
    });

    Ok((cmd_tx, evt_rx))
}

/// Background task: process commands from the TUI main loop, one at a
/// time.
async fn command_handler<P: SessionProvider + 'static, S: TaskStore>(
    mut dashboard: Dashboard<P, S>,
    auth: AuthFlow<P>,
    provider: Arc<P>,
    mut cmd_rx: mpsc::Receiver<NetCommand>,
    evt_tx: mpsc::Sender<NetEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            NetCommand::CheckSession => {
                let state = match provider.current_session().await {
                    Ok(state) => state,
                    Err(e) => {
                        tracing::warn!(error = %e, "session check failed");
                        let _ = evt_tx
                            .send(NetEvent::LoadFailed(format!("Session check failed: {e}")))
                            .await;
                        continue;
                    }
                };
                let _ = evt_tx.send(NetEvent::SessionChecked(state.clone())).await;
                if matches!(state, SessionState::Ready(_)) {
                    let nav = dashboard.mount(&state).await;
                    emit_board(&dashboard, nav, &evt_tx).await;
                }
            }
            NetCommand::SignIn { email, password } => {
                handle_auth(auth.sign_in(&email, &password).await, &mut dashboard, &evt_tx).await;
            }
            NetCommand::SignUp { email, password } => {
                handle_auth(auth.sign_up(&email, &password).await, &mut dashboard, &evt_tx).await;
            }
            NetCommand::Refresh => {
                let nav = dashboard.refresh().await;
                emit_board(&dashboard, nav, &evt_tx).await;
            }
            NetCommand::Create { title, description } => {
                let result = dashboard.create_task(&title, description.as_deref()).await;
                emit_mutation(&dashboard, result.map(|_| ()), &evt_tx).await;
            }
            NetCommand::Update { id, patch } => {
                let result = dashboard.update_task(id, &patch).await;
                emit_mutation(&dashboard, result, &evt_tx).await;
            }
            NetCommand::Toggle(id) => {
                let result = dashboard.toggle_completed(id).await;
                emit_mutation(&dashboard, result, &evt_tx).await;
            }
            NetCommand::Delete(id) => {
                let result = dashboard.delete_task(id).await;
                emit_mutation(&dashboard, result, &evt_tx).await;
            }
            NetCommand::Logout => {
                let nav = dashboard.logout().await;
                emit_board(&dashboard, nav, &evt_tx).await;
            }
            NetCommand::Shutdown => {
                tracing::info!("net command handler shutting down");
                break;
            }
        }
    }
}

/// Translate an auth outcome into events, mounting the dashboard on
/// success. A suppressed duplicate submit emits nothing.
async fn handle_auth<P: SessionProvider, S: TaskStore>(
    outcome: Result<SubmitOutcome, crate::auth::AuthError>,
    dashboard: &mut Dashboard<P, S>,
    evt_tx: &mpsc::Sender<NetEvent>,
) {
    match outcome {
        Ok(SubmitOutcome::SignedIn(user)) => {
            let _ = evt_tx.send(NetEvent::SignedIn(user.clone())).await;
            let nav = dashboard.mount(&SessionState::Ready(user)).await;
            emit_board(dashboard, nav, evt_tx).await;
        }
        Ok(SubmitOutcome::Suppressed) => {
            // The first submit is still in flight; nothing to report.
        }
        Err(e) => {
            let _ = evt_tx.send(NetEvent::AuthFailed(e.to_string())).await;
        }
    }
}

/// Emit the dashboard's post-fetch state as events.
async fn emit_board<P: SessionProvider, S: TaskStore>(
    dashboard: &Dashboard<P, S>,
    nav: Nav,
    evt_tx: &mpsc::Sender<NetEvent>,
) {
    if nav == Nav::Login {
        let _ = evt_tx.send(NetEvent::RedirectToLogin).await;
        return;
    }
    match dashboard.state() {
        LoadState::Ready => {
            let _ = evt_tx
                .send(NetEvent::TasksLoaded(dashboard.tasks().to_vec()))
                .await;
        }
        LoadState::Failed(message) => {
            let _ = evt_tx.send(NetEvent::LoadFailed(message.clone())).await;
        }
        LoadState::Loading => {}
    }
}

/// Emit events after a mutation: the updated list on success, a
/// redirect when the session turned out to be gone. Other failures
/// already produced a notice; the form keeps its contents.
async fn emit_mutation<P: SessionProvider, S: TaskStore>(
    dashboard: &Dashboard<P, S>,
    result: Result<(), crate::store::ApiError>,
    evt_tx: &mpsc::Sender<NetEvent>,
) {
    match result {
        Ok(()) => {
            let _ = evt_tx
                .send(NetEvent::TasksLoaded(dashboard.tasks().to_vec()))
                .await;
        }
        Err(e) if e.is_unauthorized() => {
            let _ = evt_tx.send(NetEvent::RedirectToLogin).await;
        }
        Err(_) => {}
    }
}

/// Background task: forward dashboard notices to the TUI.
async fn notice_forwarder(mut notice_rx: mpsc::Receiver<Notice>, evt_tx: mpsc::Sender<NetEvent>) {
    while let Some(notice) = notice_rx.recv().await {
        if evt_tx.send(NetEvent::Notice(notice)).await.is_err() {
            // TUI dropped; exit.
            break;
        }
    }
}
