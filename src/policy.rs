use std::collections::HashSet;
use std::time::Duration;

/// Configures the attempt budget and backoff curve for one logical call.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first attempt. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Growth factor of the delay between consecutive attempts. Values below
    /// 1.0 are treated as 1.0.
    pub backoff_multiplier: f64,
    /// Upper bound on any single backoff delay. `None` leaves it unbounded.
    pub max_delay: Option<Duration>,
    /// Status codes that make a failed attempt eligible for retry.
    pub retryable_status_codes: HashSet<u16>,
    /// Whether transport failures (timeout, connect, DNS) are retried.
    pub retry_on_transport_error: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1_000),
            backoff_multiplier: 2.0,
            max_delay: None,
            retryable_status_codes: [429, 500, 502, 503, 504].into_iter().collect(),
            retry_on_transport_error: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first attempt.
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// A policy for calls that must get through: more attempts, shorter
    /// initial delay, capped backoff.
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Some(Duration::from_secs(10)),
            ..Self::default()
        }
    }

    /// Sets the attempt budget. Values below 1 are clamped to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the delay before the second attempt.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff growth factor.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Caps any single backoff delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Replaces the set of retryable status codes.
    pub fn with_retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    /// Enables or disables retrying transport failures.
    pub fn with_retry_on_transport_error(mut self, retry: bool) -> Self {
        self.retry_on_transport_error = retry;
        self
    }

    /// Delay inserted before attempt `attempt` (1-indexed, meaningful for
    /// `attempt >= 2`): `initial_delay * multiplier^(attempt - 2)`, capped at
    /// `max_delay`.
    ///
    /// Pure and total: the exponential term is clamped progressively, so
    /// large attempt numbers saturate at the cap instead of overflowing.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let cap = self.max_delay.unwrap_or(Duration::MAX);
        let cap_secs = cap.as_secs_f64();
        let multiplier = self.backoff_multiplier.max(1.0);

        let mut delay_secs = self.initial_delay.as_secs_f64();
        for _ in 0..attempt.saturating_sub(2) {
            if delay_secs >= cap_secs {
                return cap;
            }
            delay_secs *= multiplier;
        }

        if delay_secs >= cap_secs {
            cap
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }

    /// True when the status code makes a failed attempt eligible for retry.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }
}
