//! Remote task-store boundary.
//!
//! Defines the [`TaskStore`] trait that all store implementations must
//! satisfy, plus the [`ApiError`] taxonomy every task operation
//! surfaces. Concrete implementations:
//! - [`http::HttpTaskStore`] — the real REST store over reqwest
//! - [`memory::InMemoryTaskStore`] — in-process store for tests, with
//!   observable call counts
//!
//! Implementations attach the bearer credential and translate wire
//! errors; they never decide UI consequences.

pub mod http;
pub mod memory;

use termtask_proto::error::ErrorCode;
use termtask_proto::task::{NewTask, Task, TaskId, TaskPatch, ValidationError};

use crate::token::BearerToken;

/// Errors surfaced by task operations.
///
/// Authentication failures are kept distinct from transport failures so
/// the UI redirects only when the session is actually gone, not when
/// the network hiccups.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No valid token could be presented, or the store rejected the
    /// one that was (401). Both normalize here so callers have a single
    /// redirect trigger.
    #[error("not authenticated")]
    Unauthorized,

    /// The input failed client-side validation; no request was made.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The store answered with a structured business error.
    #[error("{code}: {message}")]
    Remote {
        /// Machine-readable code from the error envelope.
        code: ErrorCode,
        /// Human-readable message from the error envelope.
        message: String,
        /// Optional structured context from the error envelope.
        details: Option<serde_json::Value>,
    },

    /// The store could not be reached, or a success body was malformed.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ApiError {
    /// True when the failure means "no valid session" and the UI should
    /// redirect to login.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Builds a `Remote` error with no details payload.
    #[must_use]
    pub fn remote(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
            details: None,
        }
    }
}

/// Async boundary to the remote task store.
///
/// Every method presents the bearer credential it is given; token
/// acquisition and cache coordination happen a layer up, in the API
/// client. Results follow the external contract: collections arrive
/// newest-first, mutations return the authoritative server copy.
pub trait TaskStore: Send + Sync {
    /// Fetch the full task collection, newest-first.
    fn list(
        &self,
        token: &BearerToken,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Create a task; the server assigns id and timestamps.
    fn create(
        &self,
        token: &BearerToken,
        draft: &NewTask,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Partially update a task, returning the authoritative copy.
    fn update(
        &self,
        token: &BearerToken,
        id: TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Permanently delete a task.
    fn delete(
        &self,
        token: &BearerToken,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Mark a task completed. Idempotent.
    fn complete(
        &self,
        token: &BearerToken,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Mark a task not completed. Idempotent.
    fn uncomplete(
        &self,
        token: &BearerToken,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;
}
