use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for startup connections
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,

    /// Growth factor applied after every failed attempt
    pub backoff_multiplier: f64,

    /// Scale each delay into 50-100% of its nominal value
    pub use_jitter: bool,
}

impl RetryConfig {
    /// 3 retries, 100ms initial delay, 5s cap, doubling, jittered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Nominal (pre-jitter) delays, one per allowed retry.
    pub fn delays(&self) -> Backoff {
        Backoff {
            next_ms: self.initial_delay_ms,
            remaining: self.max_retries,
            max_ms: self.max_delay_ms,
            multiplier: self.backoff_multiplier,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Exponential delay schedule produced by [`RetryConfig::delays`].
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    remaining: u32,
    max_ms: u64,
    multiplier: f64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let current = self.next_ms.min(self.max_ms);
        self.next_ms = ((self.next_ms as f64 * self.multiplier) as u64).min(self.max_ms);
        Some(Duration::from_millis(current))
    }
}

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// ```ignore
/// let config = RetryConfig::new().with_max_retries(5);
/// let client = retry_with_backoff(|| connect_from_config(&mongo), config).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delays = config.delays();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        let Some(delay) = delays.next() else {
            warn!(attempts = attempt, error = %error, "Operation failed, giving up");
            return Err(error);
        };

        let delay = if config.use_jitter {
            apply_jitter(delay)
        } else {
            delay
        };

        debug!(
            attempt,
            max_retries = config.max_retries,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "Operation failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Scale `delay` by a pseudo-random factor in [0.5, 1.0).
fn apply_jitter(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let factor = (RandomState::new().hash_one(std::time::SystemTime::now()) % 50) as f64 / 100.0 + 0.5;
    delay.mul_f64(factor)
}
