//! In-memory per-user task table.
//!
//! The server's source of truth for tasks. Each user owns an
//! independent list kept newest-first, which is the order the list
//! endpoint returns. The table also counts list calls so integration
//! tests can assert how many reads actually reached the server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use termtask_proto::auth::UserId;
use termtask_proto::task::{NewTask, Task, TaskId, TaskPatch};
use tokio::sync::RwLock;

/// In-memory task storage keyed by owning user.
///
/// Thread-safe via [`RwLock`]. Ownership is enforced here: every
/// operation takes the authenticated user and only sees that user's
/// tasks, so a valid token for one user can never address another
/// user's task (it reads as not-found).
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: RwLock<HashMap<UserId, Vec<Task>>>,
    list_calls: AtomicU64,
}

impl TaskTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of list calls served, for cache-discipline tests.
    #[must_use]
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }

    /// Returns the user's tasks, newest-first.
    pub async fn list(&self, user: UserId) -> Vec<Task> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let tasks = self.tasks.read().await;
        tasks.get(&user).cloned().unwrap_or_default()
    }

    /// Creates a task for the user, assigning id and timestamps.
    pub async fn create(&self, user: UserId, draft: &NewTask) -> Task {
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        let mut tasks = self.tasks.write().await;
        tasks.entry(user).or_default().insert(0, task.clone());
        task
    }

    /// Applies a partial update, returning the new authoritative copy.
    ///
    /// Returns `None` if the user owns no task with this id.
    pub async fn update(&self, user: UserId, id: TaskId, patch: &TaskPatch) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&user)?.iter_mut().find(|t| t.id == id)?;
        if let Some(ref title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(ref description) = patch.description {
            task.description = Some(description.clone());
        }
        if let Some(is_completed) = patch.is_completed {
            task.is_completed = is_completed;
        }
        task.updated_at = Utc::now();
        Some(task.clone())
    }

    /// Permanently deletes a task. Returns whether anything was removed.
    pub async fn delete(&self, user: UserId, id: TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let Some(list) = tasks.get_mut(&user) else {
            return false;
        };
        let before = list.len();
        list.retain(|t| t.id != id);
        list.len() != before
    }

    /// Sets the completion state. Idempotent: setting an already-set
    /// state succeeds and still bumps `updated_at`.
    ///
    /// Returns `None` if the user owns no task with this id.
    pub async fn set_completed(&self, user: UserId, id: TaskId, completed: bool) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&user)?.iter_mut().find(|t| t.id == id)?;
        task.is_completed = completed;
        task.updated_at = Utc::now();
        Some(task.clone())
    }
}
