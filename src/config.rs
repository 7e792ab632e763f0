//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::DEFAULT_RETRY_ATTEMPTS;

/// Default school identifier for the fixtures feed.
pub const DEFAULT_SCHOOL_ID: &str = "28488";

/// Default access key embedded in feed request URLs.
pub const DEFAULT_API_KEY: &str = "88E70399-79A6-4966-AB47-C6E645AE1110";

/// Default fixtures feed endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.schoolssports.com/school/xml/mso-sport.ashx";

/// Default cache directory.
pub const DEFAULT_CACHE_DIR: &str = "fixtures_cache";

/// Default number of concurrent fetch workers.
pub const DEFAULT_WORKERS: usize = 5;

/// Default inter-request delay.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`FetchEngine`](crate::fetch::FetchEngine) instance.
///
/// Defaults match a conservative production run: five workers, three
/// attempts per date, 100ms between requests, 10s request timeout.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// School identifier sent as the `ID` query parameter.
    pub school_id: String,
    /// Access key sent as the `key` query parameter.
    pub api_key: String,
    /// Feed endpoint base URL (overridable for tests).
    pub endpoint: String,
    /// Directory holding cache entries and the run log.
    pub cache_dir: PathBuf,
    /// Concurrent fetch workers (ignored in sequential mode).
    pub workers: usize,
    /// Attempts per date, including the first.
    pub retry_attempts: u32,
    /// Minimum spacing between network requests.
    pub request_delay: Duration,
    /// Timeout for a single network request.
    pub request_timeout: Duration,
    /// Run dates one at a time instead of fanning out.
    pub sequential: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            school_id: DEFAULT_SCHOOL_ID.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            workers: DEFAULT_WORKERS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sequential: false,
        }
    }
}

impl FetcherConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the feed endpoint base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the cache directory.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the attempt bound per date.
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Sets the inter-request delay.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables sequential mode.
    #[must_use]
    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_settings() {
        let config = FetcherConfig::default();
        assert_eq!(config.school_id, "28488");
        assert_eq!(config.workers, 5);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.request_delay, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.sequential);
    }

    #[test]
    fn test_builder_setters() {
        let config = FetcherConfig::new()
            .with_endpoint("http://localhost:1234/feed")
            .with_cache_dir("/tmp/fixtures")
            .with_workers(3)
            .with_retry_attempts(2)
            .with_request_delay(Duration::ZERO)
            .with_sequential(true);

        assert_eq!(config.endpoint, "http://localhost:1234/feed");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/fixtures"));
        assert_eq!(config.workers, 3);
        assert_eq!(config.retry_attempts, 2);
        assert!(config.request_delay.is_zero());
        assert!(config.sequential);
    }
}
