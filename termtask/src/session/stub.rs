//! In-process identity provider for tests.
//!
//! Plays the role the loopback transport plays for networking: a fully
//! scriptable, observable stand-in for the identity collaborator. Unit
//! tests flip the session state between calls and count sign-in
//! attempts without any network.

use std::time::Duration;

use parking_lot::Mutex;
use termtask_proto::auth::{Credentials, SessionUser, UserId};

use super::{SessionError, SessionProvider, SessionState};
use crate::token::BearerToken;

/// Token value handed out by the stub for any ready session.
pub const STUB_TOKEN: &str = "stub-bearer-token";

#[derive(Debug)]
struct StubState {
    session: SessionState,
    accounts: Vec<Credentials>,
    sign_in_calls: u32,
    sign_out_calls: u32,
    fail_sign_out: bool,
    fail_transport: bool,
}

/// Scriptable identity provider for tests.
#[derive(Debug)]
pub struct StubSessionProvider {
    state: Mutex<StubState>,
    sign_in_delay: Duration,
}

impl StubSessionProvider {
    /// Creates a stub with no session and no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                session: SessionState::Absent,
                accounts: Vec::new(),
                sign_in_calls: 0,
                sign_out_calls: 0,
                fail_sign_out: false,
                fail_transport: false,
            }),
            sign_in_delay: Duration::ZERO,
        }
    }

    /// Creates a stub already holding a ready session for `email`.
    #[must_use]
    pub fn ready(email: &str) -> Self {
        let stub = Self::new();
        stub.state.lock().session = SessionState::Ready(SessionUser {
            id: UserId::new(),
            email: email.to_string(),
        });
        stub
    }

    /// Makes sign-in take the given time, for overlap tests.
    #[must_use]
    pub const fn with_sign_in_delay(mut self, delay: Duration) -> Self {
        self.sign_in_delay = delay;
        self
    }

    /// Registers an account so sign-in can succeed against it.
    pub fn register_account(&self, email: &str, password: &str) {
        self.state.lock().accounts.push(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Drops the session, as if it expired server-side.
    pub fn set_absent(&self) {
        self.state.lock().session = SessionState::Absent;
    }

    /// Makes subsequent `sign_out` calls fail at the transport level.
    pub fn set_sign_out_fails(&self, fail: bool) {
        self.state.lock().fail_sign_out = fail;
    }

    /// Makes every call fail at the transport level.
    pub fn set_transport_fails(&self, fail: bool) {
        self.state.lock().fail_transport = fail;
    }

    /// Number of sign-in requests that actually reached the provider.
    #[must_use]
    pub fn sign_in_calls(&self) -> u32 {
        self.state.lock().sign_in_calls
    }

    /// Number of sign-out requests that actually reached the provider.
    #[must_use]
    pub fn sign_out_calls(&self) -> u32 {
        self.state.lock().sign_out_calls
    }

    fn check_transport(&self) -> Result<(), SessionError> {
        if self.state.lock().fail_transport {
            return Err(SessionError::Transport("stub transport down".to_string()));
        }
        Ok(())
    }
}

impl Default for StubSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for StubSessionProvider {
    async fn current_session(&self) -> Result<SessionState, SessionError> {
        self.check_transport()?;
        Ok(self.state.lock().session.clone())
    }

    async fn issue_token(&self) -> Result<Option<BearerToken>, SessionError> {
        self.check_transport()?;
        let state = self.state.lock();
        match state.session {
            SessionState::Ready(_) => Ok(Some(BearerToken::new(STUB_TOKEN.to_string()))),
            SessionState::Pending | SessionState::Absent => Ok(None),
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SessionUser, SessionError> {
        self.check_transport()?;
        let mut state = self.state.lock();
        if state.accounts.iter().any(|a| a.email == credentials.email) {
            return Err(SessionError::Rejected);
        }
        state.accounts.push(credentials.clone());
        let user = SessionUser {
            id: UserId::new(),
            email: credentials.email.clone(),
        };
        state.session = SessionState::Ready(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionUser, SessionError> {
        {
            let mut state = self.state.lock();
            state.sign_in_calls += 1;
            if state.fail_transport {
                return Err(SessionError::Transport("stub transport down".to_string()));
            }
        }
        if !self.sign_in_delay.is_zero() {
            tokio::time::sleep(self.sign_in_delay).await;
        }
        let mut state = self.state.lock();
        let matched = state
            .accounts
            .iter()
            .any(|a| a.email == credentials.email && a.password == credentials.password);
        if !matched {
            return Err(SessionError::Rejected);
        }
        let user = SessionUser {
            id: UserId::new(),
            email: credentials.email.clone(),
        };
        state.session = SessionState::Ready(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        state.sign_out_calls += 1;
        if state.fail_sign_out || state.fail_transport {
            return Err(SessionError::Transport("stub sign-out failed".to_string()));
        }
        state.session = SessionState::Absent;
        Ok(())
    }
}
