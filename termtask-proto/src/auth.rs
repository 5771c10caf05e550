//! Identity boundary shapes: users, credentials, and bearer tokens.
//!
//! The session itself is carried in an HTTP-only cookie and never
//! appears on the wire as a typed value; these types cover everything
//! else the identity endpoints exchange.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validity window of an issued bearer token, in seconds (7 days).
pub const TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new user identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `UserId` from an existing UUID.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated user as reported by `GET /auth/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Account identifier.
    pub id: UserId,
    /// Account email address.
    pub email: String,
}

/// Sign-in / sign-up request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password, sent only over the identity endpoints.
    pub password: String,
}

/// Response body of `POST /auth/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token for the task API.
    pub token: String,
}

/// JWT claims carried by an issued bearer token.
///
/// `sub` is the user id; `exp`/`iat` are seconds since epoch. The
/// signature uses a shared secret known to the identity provider and
/// the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id as a UUID string.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: u64,
    /// Expiry, seconds since epoch.
    pub exp: u64,
}
