//! Task API client: token attachment, error translation, and cache
//! coordination for every task operation.
//!
//! The pipeline for each operation:
//! 1. Validate input client-side (create/update) before any network work
//! 2. Acquire a fresh token via the [`TokenBridge`]; absent session
//!    fails immediately with [`ApiError::Unauthorized`], no request made
//! 3. Hand the operation to the [`TaskStore`], which attaches the
//!    credential and translates wire errors
//! 4. Coordinate the read cache: `list` reads through it, every
//!    mutation invalidates it unconditionally after remote success
//!
//! Errors are normalized into [`ApiError`] and re-raised, never
//! swallowed; the dashboard layer decides the UI consequence.

use std::sync::Arc;

use termtask_proto::task::{NewTask, Task, TaskId, TaskPatch};

use crate::cache::TaskCache;
use crate::session::SessionProvider;
use crate::store::{ApiError, TaskStore};
use crate::token::{BearerToken, TokenBridge};

/// Client for the remote task store, generic over the identity and
/// store boundaries.
#[derive(Debug)]
pub struct TaskApi<P, S> {
    bridge: TokenBridge<P>,
    store: S,
    cache: TaskCache,
}

impl<P: SessionProvider, S: TaskStore> TaskApi<P, S> {
    /// Creates an API client owning its cache cell.
    pub fn new(provider: Arc<P>, store: S, cache: TaskCache) -> Self {
        Self {
            bridge: TokenBridge::new(provider),
            store,
            cache,
        }
    }

    /// The cache cell, exposed so logout can invalidate it before the
    /// session is torn down.
    pub const fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Returns a reference to the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Acquire a token or fail as unauthenticated without touching the
    /// network path to the store.
    async fn token(&self) -> Result<BearerToken, ApiError> {
        match self.bridge.acquire().await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(ApiError::Unauthorized),
            Err(e) => Err(ApiError::Transport(e.to_string())),
        }
    }

    /// Fetch the task collection, newest-first.
    ///
    /// With `force_refresh == false`, a fresh cache entry is served
    /// without any network call. Otherwise the store is consulted and
    /// the cache slot replaced wholesale with the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no valid session exists,
    /// or the translated store failure.
    pub async fn list(&self, force_refresh: bool) -> Result<Vec<Task>, ApiError> {
        if !force_refresh
            && let Some(tasks) = self.cache.fresh()
        {
            tracing::debug!(count = tasks.len(), "serving task list from cache");
            return Ok(tasks);
        }
        let token = self.token().await?;
        let tasks = self.store.list(&token).await?;
        self.cache.replace(tasks.clone());
        Ok(tasks)
    }

    /// Create a task from raw user input.
    ///
    /// The title invariant (1-200 characters post-trim) is enforced
    /// here, before any token acquisition or network call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for bad input, otherwise the
    /// translated store failure.
    pub async fn create(&self, title: &str, description: Option<&str>) -> Result<Task, ApiError> {
        let draft = NewTask::from_input(title, description)?;
        let token = self.token().await?;
        let task = self.store.create(&token, &draft).await?;
        self.cache.invalidate();
        tracing::info!(task_id = %task.id, "task created");
        Ok(task)
    }

    /// Partially update a task, returning the authoritative server copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if a present title is invalid,
    /// otherwise the translated store failure.
    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        patch.validate()?;
        let token = self.token().await?;
        let task = self.store.update(&token, id, patch).await?;
        self.cache.invalidate();
        tracing::info!(task_id = %id, "task updated");
        Ok(task)
    }

    /// Permanently delete a task.
    ///
    /// # Errors
    ///
    /// Returns the translated store failure.
    pub async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let token = self.token().await?;
        self.store.delete(&token, id).await?;
        self.cache.invalidate();
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Mark a task completed. Idempotent on the store side.
    ///
    /// # Errors
    ///
    /// Returns the translated store failure.
    pub async fn complete(&self, id: TaskId) -> Result<Task, ApiError> {
        let token = self.token().await?;
        let task = self.store.complete(&token, id).await?;
        self.cache.invalidate();
        Ok(task)
    }

    /// Mark a task not completed. Idempotent on the store side.
    ///
    /// # Errors
    ///
    /// Returns the translated store failure.
    pub async fn uncomplete(&self, id: TaskId) -> Result<Task, ApiError> {
        let token = self.token().await?;
        let task = self.store.uncomplete(&token, id).await?;
        self.cache.invalidate();
        Ok(task)
    }
}
