//! Dashboard controller: the state machine behind the task list view.
//!
//! Owns the in-memory task list and decides every UI consequence of an
//! operation outcome: `Unauthorized` means redirect to login, any other
//! fetch failure means a retryable banner, mutation failures notify and
//! re-raise so the submitting form can also react. Mutations are not
//! rendered optimistically before the network confirms, except
//! create's prepend, which is additive and uses the server-assigned
//! task, so no rollback logic is needed.

use std::sync::Arc;

use tokio::sync::mpsc;

use termtask_proto::task::{Task, TaskId, TaskPatch};

use crate::api::TaskApi;
use crate::cache::TaskCache;
use crate::notify::Notice;
use crate::session::{SessionProvider, SessionState};
use crate::store::{ApiError, TaskStore};

/// Load state of the task list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// A fetch is pending (or the session check has not resolved).
    Loading,
    /// The list reflects the last successful fetch.
    Ready,
    /// The last fetch failed; the message feeds the retry banner.
    Failed(String),
}

/// Navigation outcome of a controller step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    /// Stay on the dashboard.
    Stay,
    /// Leave for the login view.
    Login,
}

/// Controller for the dashboard view.
pub struct Dashboard<P, S> {
    api: TaskApi<P, S>,
    provider: Arc<P>,
    tasks: Vec<Task>,
    state: LoadState,
    notices: mpsc::Sender<Notice>,
}

impl<P: SessionProvider, S: TaskStore> Dashboard<P, S> {
    /// Creates a dashboard over the given boundaries.
    ///
    /// Returns the controller and the receiver for its notices; the UI
    /// layer drains the receiver into its notice center.
    pub fn new(
        provider: Arc<P>,
        store: S,
        cache: TaskCache,
        notice_buffer: usize,
    ) -> (Self, mpsc::Receiver<Notice>) {
        let (notice_tx, notice_rx) = mpsc::channel(notice_buffer);
        let dashboard = Self {
            api: TaskApi::new(Arc::clone(&provider), store, cache),
            provider,
            tasks: Vec::new(),
            state: LoadState::Loading,
            notices: notice_tx,
        };
        (dashboard, notice_rx)
    }

    /// The task list as currently rendered, newest-first (server order).
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current load state.
    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// React to the session state on mount.
    ///
    /// `Pending` renders the loading state and takes no action; the
    /// caller re-mounts once the session check resolves. `Absent`
    /// navigates away immediately. `Ready` issues a forced refresh.
    pub async fn mount(&mut self, session: &SessionState) -> Nav {
        match session {
            SessionState::Pending => {
                self.state = LoadState::Loading;
                Nav::Stay
            }
            SessionState::Absent => Nav::Login,
            SessionState::Ready(user) => {
                tracing::debug!(user = %user.email, "dashboard mounting");
                self.refresh().await
            }
        }
    }

    /// Force-fetch the task list.
    ///
    /// An `Unauthorized` failure navigates to login without rendering
    /// any task data; this is the recovery path for silent session
    /// expiry. Any other failure becomes a retryable banner; retrying
    /// is simply calling this method again.
    pub async fn refresh(&mut self) -> Nav {
        self.state = LoadState::Loading;
        match self.api.list(true).await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.state = LoadState::Ready;
                Nav::Stay
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!(error = %e, "task fetch unauthorized, leaving for login");
                self.tasks.clear();
                Nav::Login
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
                Nav::Stay
            }
        }
    }

    /// Create a task and splice it to the front of the list.
    ///
    /// # Errors
    ///
    /// Re-raises the [`ApiError`] after emitting an error notice, so
    /// the submitting form can keep its contents for retry.
    /// Authentication failures are not noticed here; the caller turns
    /// them into a redirect.
    pub async fn create_task(
        &mut self,
        title: &str,
        description: Option<&str>,
    ) -> Result<TaskId, ApiError> {
        match self.api.create(title, description).await {
            Ok(task) => {
                let id = task.id;
                // Newest-first order is preserved: the new task is the newest.
                self.tasks.insert(0, task);
                self.notify(Notice::success("Task created"));
                Ok(id)
            }
            Err(e) => {
                self.notify_failure("Could not create task", &e);
                Err(e)
            }
        }
    }

    /// Partially update a task, replacing the list entry with the
    /// authoritative server copy.
    ///
    /// # Errors
    ///
    /// Re-raises the [`ApiError`] after emitting an error notice. On
    /// failure the list keeps the old value; nothing was rendered
    /// optimistically.
    pub async fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), ApiError> {
        match self.api.update(id, patch).await {
            Ok(task) => {
                self.replace_task(task);
                self.notify(Notice::success("Task updated"));
                Ok(())
            }
            Err(e) => {
                self.notify_failure("Could not update task", &e);
                Err(e)
            }
        }
    }

    /// Flip a task's completion state, trusting the server's returned
    /// value rather than guessing locally.
    ///
    /// # Errors
    ///
    /// Re-raises the [`ApiError`] after emitting an error notice.
    pub async fn toggle_completed(&mut self, id: TaskId) -> Result<(), ApiError> {
        let currently_completed = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .is_some_and(|t| t.is_completed);
        let result = if currently_completed {
            self.api.uncomplete(id).await
        } else {
            self.api.complete(id).await
        };
        match result {
            Ok(task) => {
                let text = if task.is_completed {
                    "Task completed"
                } else {
                    "Task reopened"
                };
                self.replace_task(task);
                self.notify(Notice::success(text));
                Ok(())
            }
            Err(e) => {
                self.notify_failure("Could not update task", &e);
                Err(e)
            }
        }
    }

    /// Delete a task and drop it from the list.
    ///
    /// The list is only mutated after the store confirms, so a failure
    /// needs no re-insertion.
    ///
    /// # Errors
    ///
    /// Re-raises the [`ApiError`] after emitting an error notice.
    pub async fn delete_task(&mut self, id: TaskId) -> Result<(), ApiError> {
        match self.api.delete(id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                self.notify(Notice::success("Task deleted"));
                Ok(())
            }
            Err(e) => {
                self.notify_failure("Could not delete task", &e);
                Err(e)
            }
        }
    }

    /// Leave the dashboard: invalidate the cache, end the session, then
    /// navigate, in that order, so no residual task data can be served
    /// mid-teardown. A failed sign-out still results in invalidation
    /// and redirect.
    pub async fn logout(&mut self) -> Nav {
        self.api.cache().invalidate();
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "sign-out failed, navigating anyway");
        }
        self.tasks.clear();
        self.state = LoadState::Loading;
        Nav::Login
    }

    /// Replace the list entry matching the task's id in place.
    fn replace_task(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    fn notify(&self, notice: Notice) {
        // Non-blocking: a full channel drops the notice, never the operation.
        let _ = self.notices.try_send(notice);
    }

    /// Error notices for everything except authentication failures,
    /// which surface as a redirect instead of a toast.
    fn notify_failure(&self, context: &str, error: &ApiError) {
        if error.is_unauthorized() {
            return;
        }
        self.notify(Notice::error(format!("{context}: {error}")));
    }
}
