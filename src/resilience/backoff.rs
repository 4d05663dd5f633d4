//! Linear backoff between retry attempts.

use std::time::Duration;

/// Delay before retrying after the zero-based `attempt` failed.
pub fn retry_delay(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(attempt.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_grows_linearly() {
        let base = Duration::from_millis(1000);
        assert_eq!(retry_delay(0, base), Duration::from_millis(1000));
        assert_eq!(retry_delay(1, base), Duration::from_millis(2000));
        assert_eq!(retry_delay(4, base), Duration::from_millis(5000));

        assert_eq!(retry_delay(3, Duration::ZERO), Duration::ZERO);
        assert_eq!(retry_delay(u32::MAX, Duration::MAX), Duration::MAX);
    }
}
