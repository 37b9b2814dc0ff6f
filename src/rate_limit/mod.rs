// Query budget for automatic per-label questions
//
// One token bucket shared by every automatic query, refilled on the loop's
// clock rather than wall time, so replays and tests see the same budget the
// live loop would.

use chrono::{DateTime, Utc};

/// Token bucket holding at most `per_minute` tokens, refilling continuously.
///
/// Starts full the first time it is charged.
pub struct RateLimiter {
    per_minute: u32,
    tokens: f64,
    refilled_at: Option<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn per_minute(per_minute: u32) -> Self {
        Self {
            per_minute,
            tokens: f64::from(per_minute),
            refilled_at: None,
        }
    }

    pub fn limit(&self) -> u32 {
        self.per_minute
    }

    /// Take one token at `now`. False when the bucket is empty.
    pub fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        let capacity = f64::from(self.per_minute);

        if let Some(refilled_at) = self.refilled_at {
            // Clock going backwards refills nothing
            let elapsed_ms = (now - refilled_at).num_milliseconds().max(0) as f64;
            self.tokens = (self.tokens + elapsed_ms * capacity / 60_000.0).min(capacity);
        }
        if self.refilled_at.map_or(true, |at| now > at) {
            self.refilled_at = Some(now);
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
