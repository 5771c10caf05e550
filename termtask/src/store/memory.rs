//! In-process task store for tests.
//!
//! The networking analogue of a loopback transport: every call that
//! would hit the wire instead touches interior state, and the store
//! counts those calls so cache-discipline tests can assert exactly how
//! many "network" round-trips happened.

use chrono::Utc;
use parking_lot::Mutex;
use termtask_proto::error::ErrorCode;
use termtask_proto::task::{NewTask, Task, TaskId, TaskPatch, validate_title};

use super::{ApiError, TaskStore};
use crate::token::BearerToken;

/// How the store should fail the next call, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    /// Reject the credential, as an expired session would.
    RejectAuth,
    /// Fail at the transport level, as an unreachable host would.
    Transport,
}

#[derive(Debug)]
struct Inner {
    tasks: Vec<Task>,
    accepted_token: String,
    list_calls: u64,
    mutation_calls: u64,
    fail_mode: Option<FailMode>,
}

/// Scriptable in-process task store.
///
/// Tasks are kept newest-first, matching the external contract. The
/// store validates titles like the real server so client-side and
/// server-side enforcement can be told apart in tests (by call counts).
#[derive(Debug)]
pub struct InMemoryTaskStore {
    inner: Mutex<Inner>,
}

impl InMemoryTaskStore {
    /// Creates an empty store accepting the given bearer token.
    #[must_use]
    pub fn new(accepted_token: &str) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tasks: Vec::new(),
                accepted_token: accepted_token.to_string(),
                list_calls: 0,
                mutation_calls: 0,
                fail_mode: None,
            }),
        }
    }

    /// Number of list calls that reached the store.
    #[must_use]
    pub fn list_calls(&self) -> u64 {
        self.inner.lock().list_calls
    }

    /// Number of mutation calls that reached the store.
    #[must_use]
    pub fn mutation_calls(&self) -> u64 {
        self.inner.lock().mutation_calls
    }

    /// Makes every subsequent call fail in the given mode until cleared.
    pub fn set_fail_mode(&self, mode: Option<FailMode>) {
        self.inner.lock().fail_mode = mode;
    }

    fn gate(inner: &Inner, token: &BearerToken) -> Result<(), ApiError> {
        match inner.fail_mode {
            Some(FailMode::RejectAuth) => return Err(ApiError::Unauthorized),
            Some(FailMode::Transport) => {
                return Err(ApiError::Transport("simulated network failure".to_string()));
            }
            None => {}
        }
        if token.as_str() == inner.accepted_token {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    fn find_mut(inner: &mut Inner, id: TaskId) -> Result<&mut Task, ApiError> {
        inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::remote(ErrorCode::NotFound, format!("no task {id}")))
    }
}

impl TaskStore for InMemoryTaskStore {
    async fn list(&self, token: &BearerToken) -> Result<Vec<Task>, ApiError> {
        let mut inner = self.inner.lock();
        inner.list_calls += 1;
        Self::gate(&inner, token)?;
        Ok(inner.tasks.clone())
    }

    async fn create(&self, token: &BearerToken, draft: &NewTask) -> Result<Task, ApiError> {
        let mut inner = self.inner.lock();
        inner.mutation_calls += 1;
        Self::gate(&inner, token)?;
        // Server-side re-validation of the title invariant.
        let title = validate_title(&draft.title)
            .map_err(|e| ApiError::remote(ErrorCode::Validation, e.to_string()))?;
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: draft.description.clone(),
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn update(
        &self,
        token: &BearerToken,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        let mut inner = self.inner.lock();
        inner.mutation_calls += 1;
        Self::gate(&inner, token)?;
        if let Some(ref title) = patch.title {
            validate_title(title)
                .map_err(|e| ApiError::remote(ErrorCode::Validation, e.to_string()))?;
        }
        let task = Self::find_mut(&mut inner, id)?;
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
        Ok(task.clone())
    }

    async fn delete(&self, token: &BearerToken, id: TaskId) -> Result<(), ApiError> {
        let mut inner = self.inner.lock();
        inner.mutation_calls += 1;
        Self::gate(&inner, token)?;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        if inner.tasks.len() == before {
            return Err(ApiError::remote(ErrorCode::NotFound, format!("no task {id}")));
        }
        Ok(())
    }

    async fn complete(&self, token: &BearerToken, id: TaskId) -> Result<Task, ApiError> {
        let mut inner = self.inner.lock();
        inner.mutation_calls += 1;
        Self::gate(&inner, token)?;
        let task = Self::find_mut(&mut inner, id)?;
        // Idempotent: completing a completed task is not an error.
        task.is_completed = true;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn uncomplete(&self, token: &BearerToken, id: TaskId) -> Result<Task, ApiError> {
        let mut inner = self.inner.lock();
        inner.mutation_calls += 1;
        Self::gate(&inner, token)?;
        let task = Self::find_mut(&mut inner, id)?;
        task.is_completed = false;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }
}
