//! One-shot-per-interval gate deciding when a digest is due

use chrono::{DateTime, Duration, Utc};

/// Elapsed-time gate for digest notifications
///
/// Idle until `interval` has passed since the last notification; a poll
/// that finds the interval elapsed fires once and restarts the clock at
/// that poll's time. It is checked at the tracker's polling cadence, so it
/// is a monotonic gate rather than a precise timer.
#[derive(Debug, Clone)]
pub struct AlertScheduler {
    interval: Duration,
    last_notification: DateTime<Utc>,
}

impl AlertScheduler {
    /// Starts the clock at `started_at`, normally the baseline creation time
    pub fn new(interval: std::time::Duration, started_at: DateTime<Utc>) -> Self {
        Self {
            interval: Duration::from_std(interval).unwrap_or(Duration::MAX),
            last_notification: started_at,
        }
    }

    /// Returns true, and resets the clock to `now`, if the interval has elapsed
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_due(now) {
            self.record_notification(now);
            true
        } else {
            false
        }
    }

    /// Checks the gate without firing it
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_notification) >= self.interval
    }

    /// Restarts the clock after a digest went out at `now`
    pub fn record_notification(&mut self, now: DateTime<Utc>) {
        self.last_notification = now;
    }

    pub fn last_notification(&self) -> DateTime<Utc> {
        self.last_notification
    }

    /// Time left until the gate opens, zero if already due
    pub fn remaining(&self, now: DateTime<Utc>) -> std::time::Duration {
        let elapsed = now.signed_duration_since(self.last_notification);
        self.interval
            .checked_sub(&elapsed)
            .and_then(|left| left.to_std().ok())
            .unwrap_or(std::time::Duration::ZERO)
    }
}
