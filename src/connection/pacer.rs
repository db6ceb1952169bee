//! Outbound flood pacing.
//!
//! Servers disconnect clients that send faster than they allow. Every frame
//! costs two seconds plus a second per 120 bytes; the cost drains in real
//! time. Once more than ten seconds of cost are outstanding, the sender
//! waits out each frame's cost before writing it.

use std::time::{Duration, Instant};

/// Outstanding cost above which frames are delayed.
const BADNESS_LIMIT: Duration = Duration::from_secs(10);

/// Cost of one frame of `len` bytes.
pub fn linetime(len: usize) -> Duration {
    Duration::from_secs(2) + Duration::from_secs(1) * len as u32 / 120
}

#[derive(Debug, Default)]
pub struct FloodPacer {
    badness: Duration,
    last_sent: Option<Instant>,
}

impl FloodPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a frame of `len` bytes sent at `now`, returning how long
    /// to wait before writing it.
    pub fn delay(&mut self, len: usize, now: Instant) -> Option<Duration> {
        let cost = linetime(len);
        let idle = self
            .last_sent
            .map_or(Duration::MAX, |last| now.saturating_duration_since(last));
        self.badness = (self.badness + cost).saturating_sub(idle);
        self.last_sent = Some(now);
        (self.badness > BADNESS_LIMIT).then_some(cost)
    }

    /// Current outstanding cost.
    pub fn badness(&self) -> Duration {
        self.badness
    }
}
