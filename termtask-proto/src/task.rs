//! Task entity and request shapes for the `TermTask` API.
//!
//! All types in this module are serialized as JSON on the wire. The
//! server assigns `id`, `created_at`, and `updated_at`; clients never
//! fabricate them. Title validation lives here so that the client can
//! enforce it pre-submit and the server can re-enforce it on receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters (post-trim).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task as returned by the remote store.
///
/// `id` and both timestamps are server-assigned; `created_at` is
/// immutable after creation. The owning user is never serialized to
/// the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier, assigned by the store.
    pub id: TaskId,
    /// Task title, 1-200 characters post-trim.
    pub title: String,
    /// Optional free-form description. Absent is `None`, never "".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// When the task was created (server clock). Immutable.
    pub created_at: DateTime<Utc>,
    /// When the task was last modified (server clock).
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request (`POST /tasks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title, validated to 1-200 characters post-trim.
    pub title: String,
    /// Optional description; omitted from the body when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTask {
    /// Builds a draft from raw user input.
    ///
    /// The title is trimmed; a whitespace-only description collapses to
    /// `None` so that "no description" is a distinct value rather than
    /// an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the trimmed title is empty or
    /// longer than [`MAX_TITLE_LENGTH`] characters.
    pub fn from_input(title: &str, description: Option<&str>) -> Result<Self, ValidationError> {
        let title = validate_title(title)?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);
        Ok(Self {
            title: title.to_string(),
            description,
        })
    }
}

/// Body of a partial update request (`PATCH /tasks/{id}`).
///
/// Absent fields are left unchanged by the store. There is no
/// clear-description operation in the API, so `description: Some(_)`
/// always means "set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title, validated like a create title when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl TaskPatch {
    /// Returns true if the patch carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_completed.is_none()
    }

    /// Validates the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a present title is empty or too
    /// long post-trim.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        Ok(())
    }
}

/// Errors produced by task input validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The title is empty after trimming.
    #[error("title must not be empty")]
    TitleEmpty,

    /// The title exceeds the maximum length.
    #[error("title must be at most {max} characters (got {len})")]
    TitleTooLong {
        /// Character count of the rejected title.
        len: usize,
        /// Maximum allowed character count.
        max: usize,
    },
}

/// Validates a task title: non-empty and at most [`MAX_TITLE_LENGTH`]
/// characters after trimming. Length is counted in characters, not
/// bytes, so multi-byte titles are not penalized.
///
/// Returns the trimmed title on success.
///
/// # Errors
///
/// Returns [`ValidationError::TitleEmpty`] or
/// [`ValidationError::TitleTooLong`].
pub fn validate_title(title: &str) -> Result<&str, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong {
            len,
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(trimmed)
}
