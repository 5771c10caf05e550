//! HTTP implementation of the identity boundary.
//!
//! Talks to the same-origin identity endpoints. The session cookie is
//! held by the reqwest cookie store and flows automatically on every
//! request, so this module never touches cookie values; it only
//! interprets statuses and bodies.

use reqwest::StatusCode;
use termtask_proto::auth::{Credentials, SessionUser, TokenResponse};
use url::Url;

use super::{SessionError, SessionProvider, SessionState};
use crate::token::BearerToken;

/// Identity provider client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    http: reqwest::Client,
    base: Url,
}

impl HttpSessionProvider {
    /// Creates a provider against the given base URL, reusing an
    /// existing cookie-store-enabled client.
    #[must_use]
    pub const fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    fn auth_url(&self, path: &str) -> Result<Url, SessionError> {
        self.base
            .join(&format!("auth/{path}"))
            .map_err(|e| SessionError::Protocol(format!("invalid base URL: {e}")))
    }

    async fn post_credentials(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<SessionUser, SessionError> {
        let url = self.auth_url(path)?;
        let response = self
            .http
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<SessionUser>()
                .await
                .map_err(|e| SessionError::Protocol(format!("malformed user body: {e}")));
        }
        // Any 4xx is a rejection; the cause is never surfaced.
        if status.is_client_error() {
            return Err(SessionError::Rejected);
        }
        Err(SessionError::Protocol(format!(
            "identity endpoint answered {status}"
        )))
    }
}

impl SessionProvider for HttpSessionProvider {
    async fn current_session(&self) -> Result<SessionState, SessionError> {
        let url = self.auth_url("session")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(SessionState::Absent),
            status if status.is_success() => {
                let user = response
                    .json::<SessionUser>()
                    .await
                    .map_err(|e| SessionError::Protocol(format!("malformed user body: {e}")))?;
                Ok(SessionState::Ready(user))
            }
            status => Err(SessionError::Protocol(format!(
                "identity endpoint answered {status}"
            ))),
        }
    }

    async fn issue_token(&self) -> Result<Option<BearerToken>, SessionError> {
        let url = self.auth_url("token")?;
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            status if status.is_success() => {
                let body = response
                    .json::<TokenResponse>()
                    .await
                    .map_err(|e| SessionError::Protocol(format!("malformed token body: {e}")))?;
                Ok(Some(BearerToken::new(body.token)))
            }
            status => Err(SessionError::Protocol(format!(
                "token endpoint answered {status}"
            ))),
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SessionUser, SessionError> {
        self.post_credentials("signup", credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionUser, SessionError> {
        self.post_credentials("login", credentials).await
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let url = self.auth_url("logout")?;
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        let status = response.status();
        // Signing out an already-dead session is still a sign-out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(SessionError::Protocol(format!(
                "logout endpoint answered {status}"
            )))
        }
    }
}

/// Builds the shared HTTP client: cookie store enabled so the session
/// cookie set by sign-in flows back on every identity request.
///
/// # Errors
///
/// Returns [`SessionError::Protocol`] if the client cannot be built.
pub fn build_client() -> Result<reqwest::Client, SessionError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .map_err(|e| SessionError::Protocol(format!("could not build HTTP client: {e}")))
}
