//! Sign-in and sign-up flow.
//!
//! Two policies live here, both deliberate:
//! - a double-submit guard: while one request is in flight, further
//!   submissions are suppressed without issuing a request, so a rapid
//!   double-Enter cannot fire two sign-ins;
//! - one generic failure message for every credential rejection. Wrong
//!   password, unknown email, and taken email read identically, which
//!   keeps the error channel from leaking which accounts exist.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use termtask_proto::auth::{Credentials, SessionUser};

use crate::session::{SessionError, SessionProvider};

/// The one message shown for any credential rejection.
pub const GENERIC_AUTH_MESSAGE: &str = "Invalid email or password";

/// Errors surfaced by the auth flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials were rejected. The message never says why.
    #[error("{GENERIC_AUTH_MESSAGE}")]
    InvalidCredentials,

    /// The identity endpoint could not be reached.
    #[error("network error: {0}")]
    Transport(String),
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request ran; the session is now established for this user.
    SignedIn(SessionUser),
    /// Another request was already in flight; nothing was sent.
    Suppressed,
}

/// Sign-in/sign-up controller with a double-submit guard.
pub struct AuthFlow<P> {
    provider: Arc<P>,
    in_flight: AtomicBool,
}

impl<P: SessionProvider> AuthFlow<P> {
    /// Creates a flow over the given identity provider.
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit a sign-in. A concurrent submit yields
    /// [`SubmitOutcome::Suppressed`] and issues no request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for any rejection, or
    /// [`AuthError::Transport`] when the provider is unreachable.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SubmitOutcome, AuthError> {
        self.submit(email, password, false).await
    }

    /// Submit a sign-up. Guarded and error-mapped like sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for any rejection
    /// (including a taken email), or [`AuthError::Transport`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SubmitOutcome, AuthError> {
        self.submit(email, password, true).await
    }

    async fn submit(
        &self,
        email: &str,
        password: &str,
        signup: bool,
    ) -> Result<SubmitOutcome, AuthError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("auth submit suppressed: request already in flight");
            return Ok(SubmitOutcome::Suppressed);
        }

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = if signup {
            self.provider.sign_up(&credentials).await
        } else {
            self.provider.sign_in(&credentials).await
        };
        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(user) => Ok(SubmitOutcome::SignedIn(user)),
            Err(SessionError::Rejected) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(AuthError::Transport(e.to_string())),
        }
    }
}
