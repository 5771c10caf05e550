//! Token bridge: session in, short-lived bearer token out.
//!
//! The bridge sits between the session boundary and the task API
//! client. It holds no token state of its own: every acquisition goes
//! back to the identity provider, which re-validates the session and
//! signs a fresh credential. This is what makes silent session expiry
//! recoverable: the first call after expiry observes "absent" instead
//! of presenting a stale token.

use std::sync::Arc;

use crate::session::{SessionError, SessionProvider};

/// A short-lived signed credential for the task API.
///
/// The token value is opaque to the client; only the store verifies
/// its signature. `Debug` redacts the value so tokens never land in
/// logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the raw token value for header attachment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Exchanges the current session for a bearer token, once per request.
#[derive(Debug, Clone)]
pub struct TokenBridge<P> {
    provider: Arc<P>,
}

impl<P: SessionProvider> TokenBridge<P> {
    /// Creates a bridge over the given identity provider.
    #[must_use]
    pub const fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Acquire a fresh bearer token for the current session.
    ///
    /// The underlying session is re-validated on every call; nothing is
    /// cached here. A missing or invalid session yields `Ok(None)`, and
    /// callers decide how to react (typically: treat as
    /// unauthenticated).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] only for transport or protocol failures
    /// reaching the provider, never for an absent session.
    pub async fn acquire(&self) -> Result<Option<BearerToken>, SessionError> {
        let token = self.provider.issue_token().await?;
        if token.is_none() {
            tracing::debug!("token bridge: no valid session");
        }
        Ok(token)
    }
}
