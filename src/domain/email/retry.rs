// Exponential backoff for the email queue

use chrono::{DateTime, Duration, Utc};

/// Backoff settings for failed sends
///
/// `delay(attempts) = min(base * 2^attempts, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: i32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::seconds(60),
            max_delay: Duration::hours(1),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: i32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    /// Delay before the next attempt after `attempts` failures so far
    ///
    /// # Example
    /// ```
    /// use cgk_platform_api::domain::email::retry::RetryPolicy;
    /// use chrono::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.calculate_retry_delay(0), Duration::seconds(60));
    /// assert_eq!(policy.calculate_retry_delay(2), Duration::seconds(240));
    /// assert_eq!(policy.calculate_retry_delay(30), Duration::hours(1));
    /// ```
    pub fn calculate_retry_delay(&self, attempts: i32) -> Duration {
        let base_ms = self.base_delay.num_milliseconds().max(0);
        let max_ms = self.max_delay.num_milliseconds().max(0);
        let exponent = attempts.clamp(0, 62) as u32;

        let delay_ms = 2i64
            .checked_pow(exponent)
            .and_then(|factor| base_ms.checked_mul(factor))
            .unwrap_or(i64::MAX);

        Duration::milliseconds(delay_ms.min(max_ms))
    }

    /// Whether a message with `attempts` recorded attempts may be tried again
    pub fn can_retry(&self, attempts: i32) -> bool {
        attempts < self.max_attempts
    }

    /// When the next attempt should run after `attempts` failures
    pub fn next_attempt_at(&self, attempts: i32, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.calculate_retry_delay(attempts)
    }
}

/// Time remaining until `next_attempt_at`, zero once it has passed
pub fn get_time_until_retry(next_attempt_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let remaining = next_attempt_at - now;
    if remaining < Duration::zero() {
        Duration::zero()
    } else {
        remaining
    }
}
