//! Range scheduler: expands a date interval into per-day fetch tasks and
//! runs them under a concurrency bound.
//!
//! Each day in the range becomes one task executing the worker protocol
//! (cache check, then network with retry). A semaphore caps how many tasks
//! hit the network at once; completions are collected as they arrive and
//! keyed by date, so downstream consumers see a deterministic ascending
//! order regardless of which day finished first.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::client::ApiClient;
use super::pacer::RequestPacer;
use super::retry::RetryPolicy;
use super::worker::{FetchResult, fetch_date};
use crate::cache::{CacheError, CacheStore};
use crate::config::FetcherConfig;
use crate::dates::{DateRange, InvalidRange};
use crate::stats::FetchStats;

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 64;

/// Error type for engine construction and range fetches.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid worker count.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The rejected value.
        value: usize,
    },

    /// The requested range is inverted.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    /// The cache directory could not be initialized or cleared.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Date-range fetch engine.
///
/// Owns the feed client, cache store, pacer, retry policy and per-instance
/// statistics. Construction validates configuration (worker bound, writable
/// cache directory) so a range fetch can only fail for per-date reasons,
/// which never abort the batch.
#[derive(Debug)]
pub struct FetchEngine {
    client: ApiClient,
    cache: CacheStore,
    pacer: Arc<RequestPacer>,
    policy: RetryPolicy,
    stats: Arc<FetchStats>,
    semaphore: Arc<Semaphore>,
    workers: usize,
    sequential: bool,
}

impl FetchEngine {
    /// Creates an engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWorkers`] for a worker count outside
    /// 1..=64, or [`EngineError::Cache`] if the cache directory cannot be
    /// created. Both are configuration errors raised before any fetching.
    #[instrument(level = "debug", skip(config), fields(cache_dir = %config.cache_dir.display()))]
    pub fn new(config: &FetcherConfig) -> Result<Self, EngineError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&config.workers) {
            return Err(EngineError::InvalidWorkers {
                value: config.workers,
            });
        }

        let cache = CacheStore::open(&config.cache_dir)?;

        debug!(
            workers = config.workers,
            retry_attempts = config.retry_attempts,
            request_delay_ms = config.request_delay.as_millis(),
            sequential = config.sequential,
            "creating fetch engine"
        );

        Ok(Self {
            client: ApiClient::from_config(config),
            cache,
            pacer: Arc::new(RequestPacer::new(config.request_delay)),
            policy: RetryPolicy::with_max_attempts(config.retry_attempts),
            stats: Arc::new(FetchStats::new()),
            semaphore: Arc::new(Semaphore::new(config.workers)),
            workers: config.workers,
            sequential: config.sequential,
        })
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns this engine's statistics handle.
    #[must_use]
    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    /// Returns the cache store backing this engine.
    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Removes all cache entries.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cache`] if entries cannot be removed.
    pub async fn clear_cache(&self) -> Result<usize, EngineError> {
        Ok(self.cache.clear().await?)
    }

    /// Fetches every day between `start` and `end` inclusive.
    ///
    /// Convenience wrapper validating the range first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRange`] when `start > end`; otherwise
    /// the same errors as [`fetch_range`](Self::fetch_range).
    pub async fn fetch_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, String>, EngineError> {
        let range = DateRange::new(start, end)?;
        self.fetch_range(range).await
    }

    /// Fetches every day of the range, returning the per-date documents.
    ///
    /// Dates that exhaust their retry budget are absent from the returned
    /// map; they show up as `failures` in the statistics instead. No
    /// per-date failure aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the concurrency semaphore
    /// is closed, which does not happen in normal operation.
    #[instrument(skip(self), fields(start = %range.start(), end = %range.end(), days = range.len()))]
    pub async fn fetch_range(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<NaiveDate, String>, EngineError> {
        info!(days = range.len(), "starting range fetch");

        let results = if self.sequential {
            self.fetch_sequential(range).await
        } else {
            self.fetch_concurrent(range).await?
        };

        let snapshot = self.stats.snapshot();
        info!(
            fetched = results.len(),
            days = range.len(),
            cache_hits = snapshot.cache_hits,
            network_calls = snapshot.network_calls,
            failures = snapshot.failures,
            "range fetch complete"
        );
        Ok(results)
    }

    /// Sequential fallback: one date at a time, no task fan-out.
    async fn fetch_sequential(&self, range: DateRange) -> BTreeMap<NaiveDate, String> {
        let mut results = BTreeMap::new();
        for date in range.iter() {
            let result = fetch_date(
                &self.client,
                &self.cache,
                &self.pacer,
                &self.policy,
                &self.stats,
                date,
            )
            .await;
            if let Some(content) = result.outcome.into_content() {
                results.insert(result.date, content);
            }
        }
        results
    }

    /// Concurrent path: one task per date under the semaphore bound.
    async fn fetch_concurrent(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<NaiveDate, String>, EngineError> {
        let mut handles = Vec::with_capacity(range.len());

        for date in range.iter() {
            // Blocks while the pool is saturated, bounding dispatch.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let client = self.client.clone();
            let cache = self.cache.clone();
            let pacer = Arc::clone(&self.pacer);
            let policy = self.policy.clone();
            let stats = Arc::clone(&self.stats);

            handles.push(tokio::spawn(async move {
                // Permit released when the task finishes (RAII).
                let _permit = permit;
                fetch_date(&client, &cache, &pacer, &policy, &stats, date).await
            }));
        }

        debug!(tasks = handles.len(), "waiting for fetch tasks");

        Ok(self.collect_results(handles).await)
    }

    /// Joins the fetch tasks, keeping successful documents keyed by date.
    async fn collect_results(
        &self,
        handles: Vec<JoinHandle<FetchResult>>,
    ) -> BTreeMap<NaiveDate, String> {
        let mut results = BTreeMap::new();
        for handle in handles {
            match handle.await {
                Ok(result) => {
                    if let Some(content) = result.outcome.into_content() {
                        results.insert(result.date, content);
                    }
                }
                Err(e) => {
                    // A panicked task produced no terminal outcome; count it
                    // as a failure so every dispatched date is accounted for.
                    warn!(error = %e, "fetch task panicked");
                    self.stats.record_failure();
                }
            }
        }
        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn test_config(dir: &TempDir) -> FetcherConfig {
        FetcherConfig::new()
            .with_cache_dir(dir.path())
            .with_request_delay(std::time::Duration::ZERO)
    }

    #[test]
    fn test_new_valid_workers() {
        let dir = TempDir::new().unwrap();
        let engine = FetchEngine::new(&test_config(&dir).with_workers(1)).unwrap();
        assert_eq!(engine.workers(), 1);

        let engine = FetchEngine::new(&test_config(&dir).with_workers(64)).unwrap();
        assert_eq!(engine.workers(), 64);
    }

    #[test]
    fn test_new_rejects_zero_workers() {
        let dir = TempDir::new().unwrap();
        let result = FetchEngine::new(&test_config(&dir).with_workers(0));
        assert!(matches!(
            result,
            Err(EngineError::InvalidWorkers { value: 0 })
        ));
    }

    #[test]
    fn test_new_rejects_excessive_workers() {
        let dir = TempDir::new().unwrap();
        let result = FetchEngine::new(&test_config(&dir).with_workers(65));
        assert!(matches!(
            result,
            Err(EngineError::InvalidWorkers { value: 65 })
        ));
    }

    #[tokio::test]
    async fn test_fetch_between_rejects_inverted_range() {
        let dir = TempDir::new().unwrap();
        let engine = FetchEngine::new(&test_config(&dir)).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let result = engine.fetch_between(start, end).await;
        assert!(matches!(result, Err(EngineError::InvalidRange(_))));

        // Nothing was attempted.
        let snapshot = engine.stats().snapshot();
        assert_eq!(snapshot.cache_hits + snapshot.network_calls + snapshot.failures, 0);
    }

    #[tokio::test]
    async fn test_panicked_task_counts_as_failure() {
        let dir = TempDir::new().unwrap();
        let engine = FetchEngine::new(&test_config(&dir)).unwrap();

        let handle: JoinHandle<FetchResult> = tokio::spawn(async { panic!("worker blew up") });
        let results = engine.collect_results(vec![handle]).await;

        assert!(results.is_empty());
        let snapshot = engine.stats().snapshot();
        assert_eq!(snapshot.failures, 1, "a lost task still gets an outcome");
        assert_eq!(snapshot.cache_hits + snapshot.network_calls, 0);
    }

    #[test]
    fn test_engine_error_display() {
        let error = EngineError::InvalidWorkers { value: 0 };
        let msg = error.to_string();
        assert!(msg.contains("invalid worker count"));
        assert!(msg.contains("64"));
    }
}
