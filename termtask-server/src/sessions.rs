//! User accounts and cookie sessions.
//!
//! A registry of accounts (email → salted password digest) and live
//! sessions (opaque sid → user). This is the identity half of the
//! reference server: enough to give the client a faithful boundary to
//! integrate against. Password handling is a salted SHA-256 digest,
//! which is fine for a test fixture holding throwaway credentials.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use termtask_proto::auth::{SessionUser, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors from account registration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    /// An account already exists for this email.
    #[error("email already registered")]
    EmailTaken,

    /// The email or password is empty.
    #[error("email and password are required")]
    MissingFields,
}

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    email: String,
    salt: [u8; 16],
    digest: [u8; 32],
}

impl Account {
    fn verify(&self, password: &str) -> bool {
        digest_password(&self.salt, password) == self.digest
    }
}

fn digest_password(salt: &[u8; 16], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Registry of accounts and live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, UserId>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// Returns [`SignupError::EmailTaken`] for a duplicate email or
    /// [`SignupError::MissingFields`] for empty input.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser, SignupError> {
        let email = email.trim().to_ascii_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(SignupError::MissingFields);
        }
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(SignupError::EmailTaken);
        }
        let salt: [u8; 16] = *Uuid::new_v4().as_bytes();
        let account = Account {
            id: UserId::new(),
            email: email.clone(),
            salt,
            digest: digest_password(&salt, password),
        };
        let user = SessionUser {
            id: account.id,
            email: account.email.clone(),
        };
        accounts.insert(email, account);
        Ok(user)
    }

    /// Verifies credentials, returning the user on match.
    pub async fn verify(&self, email: &str, password: &str) -> Option<SessionUser> {
        let email = email.trim().to_ascii_lowercase();
        let accounts = self.accounts.read().await;
        let account = accounts.get(&email)?;
        if account.verify(password) {
            Some(SessionUser {
                id: account.id,
                email: account.email.clone(),
            })
        } else {
            None
        }
    }

    /// Opens a session for the user, returning the opaque sid for the
    /// cookie.
    pub async fn create_session(&self, user: UserId) -> String {
        let sid = Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(sid.clone(), user);
        sid
    }

    /// Resolves a sid to its user, if the session is alive.
    pub async fn lookup(&self, sid: &str) -> Option<UserId> {
        self.sessions.read().await.get(sid).copied()
    }

    /// Resolves a sid to the full session user.
    pub async fn lookup_user(&self, sid: &str) -> Option<SessionUser> {
        let user_id = self.lookup(sid).await?;
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .find(|a| a.id == user_id)
            .map(|a| SessionUser {
                id: a.id,
                email: a.email.clone(),
            })
    }

    /// Destroys a session. Idempotent.
    pub async fn destroy(&self, sid: &str) -> bool {
        self.sessions.write().await.remove(sid).is_some()
    }
}
