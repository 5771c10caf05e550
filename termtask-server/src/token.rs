//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs: subject = user id, 7-day expiry, signed with
//! a secret shared between the identity side and the task store side
//! of the server. The client treats the token as opaque.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use termtask_proto::auth::{TOKEN_TTL_SECS, TokenClaims, UserId};
use uuid::Uuid;

/// Errors from token handling.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token is missing, malformed, expired, or badly signed.
    #[error("invalid token")]
    Invalid,

    /// Signing failed (key material problem).
    #[error("could not sign token: {0}")]
    Signing(String),
}

/// Issues and verifies bearer tokens with a shared secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    /// Creates a signer from the shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Issues a token for the user, valid for
    /// [`TOKEN_TTL_SECS`] from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, user: UserId) -> Result<String, TokenError> {
        let now = Self::now_secs();
        let claims = TokenClaims {
            sub: user.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies a token, returning the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for any verification failure:
    /// bad signature, expired, or a subject that is not a user id.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;
        let uuid = Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)?;
        Ok(UserId::from_uuid(uuid))
    }
}
