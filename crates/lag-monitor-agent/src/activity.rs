// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Last-activity bookkeeping for connected sessions.
///
/// Two call sites mutate this map (activity events and idle checks), so the
/// whole read-modify-write sits behind one mutex.
///
/// A session that has never been touched reads as zero idle time: the first
/// check after connect can never flag it. Deliberate, and pinned down by the
/// tests. `touch` overwrites unconditionally (last write wins); a
/// last-activity time in the future clamps to zero idle.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    entries: Mutex<HashMap<String, SystemTime>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` as the session's last-activity time.
    pub fn touch(&self, session_id: &str, now: SystemTime) {
        #[allow(clippy::expect_used)]
        let mut entries = self.entries.lock().expect("activity lock poisoned");
        entries.insert(session_id.to_string(), now);
    }

    /// How long the session has been idle as of `now`. Unseen sessions are
    /// treated as active right now.
    pub fn idle_for(&self, session_id: &str, now: SystemTime) -> Duration {
        #[allow(clippy::expect_used)]
        let entries = self.entries.lock().expect("activity lock poisoned");
        match entries.get(session_id) {
            Some(last) => now.duration_since(*last).unwrap_or_default(),
            None => Duration::ZERO,
        }
    }

    /// Drop a session's entry. Hosts call this on disconnect so the map does
    /// not grow with every session identifier ever seen.
    pub fn forget(&self, session_id: &str) {
        #[allow(clippy::expect_used)]
        let mut entries = self.entries.lock().expect("activity lock poisoned");
        entries.remove(session_id);
    }

    pub fn tracked_sessions(&self) -> usize {
        #[allow(clippy::expect_used)]
        let entries = self.entries.lock().expect("activity lock poisoned");
        entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_for_is_elapsed_since_touch() {
        let tracker = ActivityTracker::new();
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let t2 = t1 + Duration::from_secs(42);

        tracker.touch("steve", t1);
        assert_eq!(tracker.idle_for("steve", t2), Duration::from_secs(42));
    }

    #[test]
    fn test_untouched_session_is_never_idle() {
        // Documented quirk: a session with no recorded activity reads as
        // fresh, so it cannot be flagged idle on its first check.
        let tracker = ActivityTracker::new();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        assert_eq!(tracker.idle_for("ghost", now), Duration::ZERO);
    }

    #[test]
    fn test_touch_overwrites_unconditionally() {
        let tracker = ActivityTracker::new();
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let t2 = t1 + Duration::from_secs(10);

        tracker.touch("steve", t2);
        // An out-of-order event still wins: last write is the truth.
        tracker.touch("steve", t1);
        assert_eq!(
            tracker.idle_for("steve", t2),
            Duration::from_secs(10),
            "idle time is measured from the overwritten timestamp"
        );
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero_idle() {
        let tracker = ActivityTracker::new();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        tracker.touch("steve", now + Duration::from_secs(5));
        assert_eq!(tracker.idle_for("steve", now), Duration::ZERO);
    }

    #[test]
    fn test_forget_removes_entry() {
        let tracker = ActivityTracker::new();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);

        tracker.touch("steve", now);
        tracker.touch("alex", now);
        assert_eq!(tracker.tracked_sessions(), 2);

        tracker.forget("steve");
        assert_eq!(tracker.tracked_sessions(), 1);
        // Once forgotten, the session reads as fresh again.
        assert_eq!(
            tracker.idle_for("steve", now + Duration::from_secs(600)),
            Duration::ZERO
        );
    }
}
