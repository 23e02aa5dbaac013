//! Test utility functions for integration tests
//!
//! Logging setup and the timing constants shared by the S1AP scenarios.

use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for tests with optional filter
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Default timeout for test operations
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to listen before concluding that nothing was sent
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Release guard timer used by the timer scenarios
pub const FAST_RELEASE_TIMER_MS: u64 = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_twice() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_quiet_period_outlasts_release_timer() {
        assert!(QUIET_PERIOD > Duration::from_millis(FAST_RELEASE_TIMER_MS));
        assert!(QUIET_PERIOD < DEFAULT_TEST_TIMEOUT);
    }
}
