//! User-visible notifications.
//!
//! The dashboard dispatches [`Notice`]s over an mpsc channel; the TUI
//! collects them into a [`NoticeCenter`] that auto-dismisses entries
//! after a TTL. Dismissal is cooperative: the poll loop calls
//! [`NoticeCenter::prune`] on each tick, so no timer threads exist.

use std::time::{Duration, Instant};

/// Default time a notice stays visible.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Severity of a notice, controlling its styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// A mutation succeeded.
    Success,
    /// Something went wrong.
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity level.
    pub level: NoticeLevel,
    /// Message text.
    pub text: String,
}

impl Notice {
    /// Builds an info notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// Builds a success notice.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    /// Builds an error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// A notice with its dismissal deadline.
#[derive(Debug, Clone)]
pub struct ActiveNotice {
    /// The notice itself.
    pub notice: Notice,
    expires_at: Instant,
}

/// Holds currently visible notices and expires them over time.
///
/// Methods take `now` explicitly so tests control the clock.
#[derive(Debug)]
pub struct NoticeCenter {
    active: Vec<ActiveNotice>,
    ttl: Duration,
}

impl NoticeCenter {
    /// Creates a center with the given auto-dismiss TTL.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            active: Vec::new(),
            ttl,
        }
    }

    /// Adds a notice, visible until `now + ttl`.
    pub fn push(&mut self, notice: Notice, now: Instant) {
        self.active.push(ActiveNotice {
            notice,
            expires_at: now + self.ttl,
        });
    }

    /// Drops every notice whose deadline has passed.
    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|n| n.expires_at > now);
    }

    /// Manually dismisses the notice at `index`, if it exists.
    pub fn dismiss(&mut self, index: usize) {
        if index < self.active.len() {
            self.active.remove(index);
        }
    }

    /// Currently visible notices, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[ActiveNotice] {
        &self.active
    }

    /// True when nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Default for NoticeCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
