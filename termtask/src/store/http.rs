//! HTTP implementation of the task-store boundary.
//!
//! Speaks the REST contract: JSON bodies, bearer credential on every
//! request, structured error envelopes on any non-2xx. Timeout and
//! connection semantics are reqwest's defaults; failures surface
//! immediately as [`ApiError::Transport`] with no retry.

use reqwest::{Response, StatusCode, header};
use termtask_proto::error::{ErrorCode, ErrorEnvelope};
use termtask_proto::task::{NewTask, Task, TaskId, TaskPatch};
use url::Url;

use super::{ApiError, TaskStore};
use crate::token::BearerToken;

/// Message used when an error body cannot be parsed.
const GENERIC_ERROR_MESSAGE: &str = "the task service returned an unexpected error";

/// REST client for the remote task store.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    http: reqwest::Client,
    base: Url,
}

impl HttpTaskStore {
    /// Creates a store client against the given base URL, reusing an
    /// existing reqwest client (shared with the session provider, as a
    /// browser would share its network stack).
    #[must_use]
    pub const fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    fn tasks_url(&self) -> Result<Url, ApiError> {
        self.base
            .join("tasks")
            .map_err(|e| ApiError::Transport(format!("invalid base URL: {e}")))
    }

    fn task_url(&self, id: TaskId, suffix: &str) -> Result<Url, ApiError> {
        self.base
            .join(&format!("tasks/{id}{suffix}"))
            .map_err(|e| ApiError::Transport(format!("invalid base URL: {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url, token: &BearerToken) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token.as_str())
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Checks the response status and translates failures.
    ///
    /// A 401 always means the credential was rejected, regardless of
    /// body. Other non-2xx statuses are decoded from the error
    /// envelope; an unparsable body synthesizes an `UNKNOWN` code
    /// rather than losing the failure.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = response.bytes().await.unwrap_or_default();
        match serde_json::from_slice::<ErrorEnvelope>(&body) {
            Ok(envelope) if envelope.error.code == ErrorCode::Unauthorized => {
                Err(ApiError::Unauthorized)
            }
            Ok(envelope) => Err(ApiError::Remote {
                code: envelope.error.code,
                message: envelope.error.message,
                details: envelope.error.details,
            }),
            Err(e) => {
                tracing::warn!(status = %status, error = %e, "unparsable error body");
                Err(ApiError::remote(ErrorCode::Unknown, GENERIC_ERROR_MESSAGE))
            }
        }
    }

    async fn read_task(response: Response) -> Result<Task, ApiError> {
        Self::check(response)
            .await?
            .json::<Task>()
            .await
            .map_err(|e| ApiError::Transport(format!("malformed task body: {e}")))
    }
}

impl TaskStore for HttpTaskStore {
    async fn list(&self, token: &BearerToken) -> Result<Vec<Task>, ApiError> {
        let url = self.tasks_url()?;
        let response = self
            .request(reqwest::Method::GET, url, token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::check(response)
            .await?
            .json::<Vec<Task>>()
            .await
            .map_err(|e| ApiError::Transport(format!("malformed task list: {e}")))
    }

    async fn create(&self, token: &BearerToken, draft: &NewTask) -> Result<Task, ApiError> {
        let url = self.tasks_url()?;
        let response = self
            .request(reqwest::Method::POST, url, token)
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_task(response).await
    }

    async fn update(
        &self,
        token: &BearerToken,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        let url = self.task_url(id, "")?;
        let response = self
            .request(reqwest::Method::PATCH, url, token)
            .json(patch)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_task(response).await
    }

    async fn delete(&self, token: &BearerToken, id: TaskId) -> Result<(), ApiError> {
        let url = self.task_url(id, "")?;
        let response = self
            .request(reqwest::Method::DELETE, url, token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        // 204: empty body, unit result.
        Self::check(response).await?;
        Ok(())
    }

    async fn complete(&self, token: &BearerToken, id: TaskId) -> Result<Task, ApiError> {
        let url = self.task_url(id, "/complete")?;
        let response = self
            .request(reqwest::Method::POST, url, token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_task(response).await
    }

    async fn uncomplete(&self, token: &BearerToken, id: TaskId) -> Result<Task, ApiError> {
        let url = self.task_url(id, "/complete")?;
        let response = self
            .request(reqwest::Method::DELETE, url, token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_task(response).await
    }
}
