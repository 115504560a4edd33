//! Write-time timestamp assignment.
//!
//! Turn timestamps are wall-clock milliseconds, used both as ordering key
//! and as the sort-key component of the primary key. Two writes landing in
//! the same millisecond would collide, so the clock nudges forward past the
//! last value it handed out. Atomic, not mutex-enforced — last-write-wins
//! across processes is accepted under current load assumptions.

use std::sync::atomic::{AtomicI64, Ordering};

/// A monotonic wall-clock millisecond source.
#[derive(Debug, Default)]
pub struct TurnClock {
    last: AtomicI64,
}

impl TurnClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next timestamp: wall-clock millis, strictly greater than any
    /// value previously returned by this clock.
    pub fn next_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            // the closure always returns Some
            .map(|last| now.max(last + 1))
            .unwrap_or(now)
    }
}
