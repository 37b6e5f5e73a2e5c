//! Short-lived user-facing messages.
//!
//! Failures that the user should see (a rejected login, a full store) are
//! pushed here and shown until they expire.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_millis(2600);

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// Queue of transient notices.
#[derive(Debug)]
pub struct Notices {
    ttl: Duration,
    entries: Mutex<VecDeque<Notice>>,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(NOTICE_TTL)
    }
}

impl Notices {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Show `message` for the configured time.
    pub fn push(&self, message: impl Into<String>) {
        self.push_at(message.into(), Instant::now());
    }

    /// Messages that have not expired yet, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<String> {
        self.active_at(Instant::now())
    }

    fn push_at(&self, message: String, now: Instant) {
        debug!(%message, "Notice");
        let notice = Notice {
            message,
            expires_at: now + self.ttl,
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_back(notice);
        }
    }

    fn active_at(&self, now: Instant) -> Vec<String> {
        let Ok(mut entries) = self.entries.lock() else {
            return Vec::new();
        };
        entries.retain(|notice| notice.expires_at > now);
        entries.iter().map(|notice| notice.message.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_expire() {
        let notices = Notices::default();
        let start = Instant::now();
        notices.push_at("Added to cart".into(), start);
        notices.push_at("Saved".into(), start + Duration::from_millis(1000));

        assert_eq!(
            notices.active_at(start + Duration::from_millis(2000)),
            ["Added to cart", "Saved"]
        );
        assert_eq!(
            notices.active_at(start + Duration::from_millis(2600)),
            ["Saved"]
        );
        assert!(notices.active_at(start + Duration::from_millis(3600)).is_empty());
    }

    #[test]
    fn test_push_is_visible_immediately() {
        let notices = Notices::default();
        notices.push("Login failed");
        assert_eq!(notices.active(), ["Login failed"]);
    }
}
