// Simulated progress for a request whose transport reports no progress.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// How often the displayed percentage advances while a request is pending.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(300);

/// Highest value reachable before the response arrives.
pub const PROGRESS_CAP: u8 = 99;

pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress(u8);

impl Progress {
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Fraction in `0.0..=1.0`, for gauges.
    pub fn ratio(self) -> f64 {
        f64::from(self.0) / f64::from(PROGRESS_COMPLETE)
    }

    pub fn is_complete(self) -> bool {
        self.0 >= PROGRESS_COMPLETE
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Advance by one, never past the cap. A completed value is left alone.
    pub fn tick(&mut self) {
        if self.0 < PROGRESS_CAP {
            self.0 += 1;
        }
    }

    pub fn complete(&mut self) {
        self.0 = PROGRESS_COMPLETE;
    }
}

/// Repeating timer for the simulator. The first tick fires one full period
/// after creation.
pub fn progress_ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + PROGRESS_INTERVAL, PROGRESS_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
