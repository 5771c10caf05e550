//! Session boundary: the identity collaborator as seen by this client.
//!
//! Defines the [`SessionProvider`] trait that all identity
//! implementations must satisfy. Concrete implementations:
//! - [`http::HttpSessionProvider`] — same-origin identity endpoints over
//!   HTTP, session carried in a cookie store
//! - [`stub::StubSessionProvider`] — in-process test double
//!
//! The client only consumes three facts from the identity collaborator:
//! "is there a valid session", "give me a bearer token for it", and
//! "end this session", plus sign-in/sign-up to establish one. The
//! provider's internal storage and password handling are opaque here.

pub mod http;
pub mod stub;

use termtask_proto::auth::{Credentials, SessionUser};

use crate::token::BearerToken;

/// Observed state of the current session.
///
/// `Pending` is produced by the application shell before the first
/// session check resolves; providers themselves only ever report
/// `Ready` or `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The session check has not resolved yet.
    Pending,
    /// A valid session exists for this user.
    Ready(SessionUser),
    /// No valid session exists.
    Absent,
}

/// Errors that can occur at the identity boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The identity endpoint rejected the supplied credentials.
    ///
    /// Deliberately carries no cause: wrong password, unknown email,
    /// and taken email are indistinguishable to callers.
    #[error("credentials rejected")]
    Rejected,

    /// The identity endpoint could not be reached.
    #[error("identity endpoint unreachable: {0}")]
    Transport(String),

    /// The identity endpoint answered with something unexpected.
    #[error("unexpected identity response: {0}")]
    Protocol(String),
}

/// Async identity boundary trait.
///
/// # Invariant
///
/// `issue_token` must re-validate the underlying session on every call.
/// An absent or invalid session is `Ok(None)`, a structured signal
/// rather than an error, so callers can treat "unauthenticated" as a
/// state instead of a failure.
pub trait SessionProvider: Send + Sync {
    /// Report whether a valid session currently exists.
    fn current_session(
        &self,
    ) -> impl std::future::Future<Output = Result<SessionState, SessionError>> + Send;

    /// Exchange the current session for a fresh short-lived bearer
    /// token scoped to the task API.
    ///
    /// Returns `Ok(None)` when no valid session exists.
    fn issue_token(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<BearerToken>, SessionError>> + Send;

    /// Create an account and establish a session for it.
    fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<SessionUser, SessionError>> + Send;

    /// Establish a session for an existing account.
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<SessionUser, SessionError>> + Send;

    /// End the current session. Ending an already-absent session is not
    /// an error.
    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;
}
