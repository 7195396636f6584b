//! Per-invocation coordinator configuration and retry backoff.

use std::time::Duration;

use docrelay_core::keys::DEAD_LETTER_PREFIX;

/// Maximum delay before retrying a failed remote call. Caps exponential
/// backoff so high attempt counts do not produce excessively long delays.
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Computes the backoff before the given retry (exponential with cap).
/// `attempt` is the 1-based attempt that just failed.
#[inline]
pub fn retry_backoff(base: Duration, attempt: u32) -> Duration {
    let scaled = base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)));
    scaled.min(MAX_RETRY_BACKOFF)
}

/// Explicit per-invocation configuration for the coordinator.
///
/// Passed into every `submit` call instead of living in process-wide
/// settings, so tests and tenants can override any knob without shared
/// state.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Total upload attempts (first try included). Must be at least 1.
    pub max_upload_attempts: u32,
    /// Total dispatch attempts (first try included). Must be at least 1.
    pub max_dispatch_attempts: u32,
    /// Base delay for exponential backoff between retries.
    pub retry_backoff: Duration,
    /// Deadline for each individual upload attempt.
    pub upload_timeout: Duration,
    /// Deadline for each individual dispatch attempt.
    pub dispatch_timeout: Duration,
    /// Key prefix under which orphaned notifications are parked.
    pub dead_letter_prefix: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_attempts: 3,
            max_dispatch_attempts: 3,
            retry_backoff: Duration::from_millis(200),
            upload_timeout: Duration::from_secs(30),
            dispatch_timeout: Duration::from_secs(10),
            dead_letter_prefix: DEAD_LETTER_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let base = Duration::from_millis(200);
        assert_eq!(retry_backoff(base, 1), Duration::from_millis(200));
        assert_eq!(retry_backoff(base, 2), Duration::from_millis(400));
        assert_eq!(retry_backoff(base, 3), Duration::from_millis(800));
        assert_eq!(retry_backoff(base, 30), MAX_RETRY_BACKOFF);
    }
}
