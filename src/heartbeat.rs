//! Periodic liveness signal timing.

use std::time::{Duration, Instant};

/// Decides when a heartbeat is due.
///
/// Uses a monotonic elapsed-since-last-trigger check, so the trigger fires at
/// most once per period window regardless of how often the loop polls. The
/// scheduler is armed at construction; the first heartbeat is due one full
/// period after startup.
pub struct HeartbeatScheduler {
    period: Duration,
    last_fired: Instant,
}

impl HeartbeatScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_fired: Instant::now(),
        }
    }

    /// True when a full period has elapsed since the last trigger. A `true`
    /// return consumes the window.
    pub fn due(&mut self) -> bool {
        self.due_at(Instant::now())
    }

    fn due_at(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_fired) >= self.period {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
