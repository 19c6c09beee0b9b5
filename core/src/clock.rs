//! Game clock — the engine's view of wall time, plus pause state.
//!
//! The host's timers drive [`crate::engine::GameEngine::tick`] with real
//! deltas; the clock turns those deltas into a monotone `now_ms` so the
//! engine never reads the platform clock itself. `synchronize` is only
//! called at startup and resume, with a timestamp the host supplies.

use crate::types::{Seconds, TimestampMs};

#[derive(Debug, Clone, PartialEq)]
pub struct GameClock {
    pub now_ms: TimestampMs,
    pub paused: bool,
}

impl GameClock {
    pub fn new(now_ms: TimestampMs) -> Self {
        Self {
            now_ms,
            paused: false,
        }
    }

    /// Advance by an elapsed delta. Ticks only arrive while running.
    pub fn advance(&mut self, delta: Seconds) {
        self.now_ms += (delta * 1000.0) as TimestampMs;
    }

    /// Jump to an externally supplied wall-clock instant (startup/resume).
    pub fn synchronize(&mut self, now_ms: TimestampMs) {
        self.now_ms = now_ms;
    }

    // Idempotent: a full reset may stop timers that are already stopped.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}
