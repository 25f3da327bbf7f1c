//! Timestamp type used throughout the relay pipeline.
//!
//! Timestamps are Unix epoch seconds (UTC). The staleness sweep compares
//! job creation times against wall-clock time, so every persisted record
//! carries one of these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    ///
    /// The staleness sweep calls this with the configured threshold; taking
    /// `now` as a parameter keeps the sweep testable without a real clock.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive_and_saturating() {
        let t = Timestamp::new(100);
        assert!(t.has_expired(50, Timestamp::new(150)));
        assert!(!t.has_expired(50, Timestamp::new(149)));
        // near u64::MAX the deadline saturates instead of wrapping
        let late = Timestamp::new(u64::MAX - 1);
        assert!(!late.has_expired(100, Timestamp::new(u64::MAX - 2)));
    }
}
