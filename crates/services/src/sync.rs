use std::future::Future;
use std::time::Duration;

/// Caller-visible persistence state of the in-memory program state.
///
/// Writes are optimistic: local state updates immediately and the gateway
/// write happens behind it. `Dirty` means at least the most recent write
/// gave up after retries, so what is rendered may not be durably saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Synced,
    Syncing,
    Dirty,
}

/// Bounded retry with exponential backoff for gateway writes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A policy with explicit bounds. `max_attempts` counts the first try;
    /// zero is normalized to one attempt.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A single attempt, no waiting. Useful in tests.
    #[must_use]
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn delay_for(&self, failed_attempts: u32) -> Duration {
        // 250ms, 500ms, 1s, ... for the default policy.
        self.base_delay * 2_u32.saturating_pow(failed_attempts.saturating_sub(1))
    }

    /// Run `op` until it succeeds or the attempt budget is spent, sleeping
    /// between attempts. The final error is returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `op`.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut failed = 0_u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failed += 1;
                    if failed >= self.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.delay_for(failed)).await;
                }
            }
        }
    }
}
