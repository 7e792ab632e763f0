//! Single-date fetch protocol: cache check, then network with bounded retry.

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use super::client::ApiClient;
use super::error::FetchError;
use super::pacer::RequestPacer;
use super::retry::{RetryDecision, RetryPolicy};
use crate::cache::CacheStore;
use crate::dates::cache_key;
use crate::stats::FetchStats;

/// Terminal outcome of fetching one date.
///
/// Exactly one outcome is produced per dispatched date, and exactly one
/// statistics counter is bumped for it.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Served from the on-disk cache; no network call was made.
    CachedHit(String),
    /// Fetched from the feed and written back to the cache.
    NetworkSuccess(String),
    /// Every attempt failed; carries the last error.
    Failure(FetchError),
}

impl FetchOutcome {
    /// Consumes the outcome, yielding the document for successful fetches.
    #[must_use]
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::CachedHit(content) | Self::NetworkSuccess(content) => Some(content),
            Self::Failure(_) => None,
        }
    }

    /// Returns whether this outcome is a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Result of one date's fetch task.
#[derive(Debug)]
pub struct FetchResult {
    /// The day this result belongs to.
    pub date: NaiveDate,
    /// What happened.
    pub outcome: FetchOutcome,
}

/// Fetches one date: cache first, then the network with retry.
///
/// Protocol:
/// 1. Probe the cache; a hit short-circuits without touching the network.
/// 2. On a miss, loop up to the policy's attempt bound. Each attempt waits
///    for a pacer slot (rate limiting, including the first attempt), then
///    issues one timeout-bounded request.
/// 3. A success is written back to the cache; a failed cache write is logged
///    and the content is still returned.
/// 4. Failed attempts back off exponentially until the budget is spent, at
///    which point the last error becomes the terminal outcome.
#[instrument(level = "debug", skip_all, fields(date = %date))]
pub(crate) async fn fetch_date(
    client: &ApiClient,
    cache: &CacheStore,
    pacer: &RequestPacer,
    policy: &RetryPolicy,
    stats: &FetchStats,
    date: NaiveDate,
) -> FetchResult {
    let key = cache_key(date);

    if let Some(content) = cache.get(&key).await {
        debug!(%date, "cache hit");
        stats.record_cache_hit();
        return FetchResult {
            date,
            outcome: FetchOutcome::CachedHit(content),
        };
    }

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        pacer.acquire().await;

        match client.fetch_day(date).await {
            Ok(body) => {
                if let Err(e) = cache.put(&key, &body).await {
                    // Non-fatal: the caller still gets the content.
                    warn!(%date, error = %e, "failed to persist cache entry");
                }
                stats.record_network_call();
                info!(%date, attempt, "fetched from network");
                return FetchResult {
                    date,
                    outcome: FetchOutcome::NetworkSuccess(body),
                };
            }
            Err(e) => {
                warn!(%date, attempt, error = %e, "fetch attempt failed");
                match policy.should_retry(attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        debug!(
                            %date,
                            next_attempt,
                            delay_ms = delay.as_millis(),
                            "backing off before retry"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::GiveUp { reason } => {
                        warn!(%date, %reason, "giving up on date");
                        stats.record_failure();
                        return FetchResult {
                            date,
                            outcome: FetchOutcome::Failure(e),
                        };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_into_content() {
        assert_eq!(
            FetchOutcome::CachedHit("<a/>".into()).into_content().as_deref(),
            Some("<a/>")
        );
        assert_eq!(
            FetchOutcome::NetworkSuccess("<b/>".into())
                .into_content()
                .as_deref(),
            Some("<b/>")
        );
        let failed = FetchOutcome::Failure(FetchError::timeout("http://feed.example"));
        assert!(failed.is_failure());
        assert_eq!(failed.into_content(), None);
    }
}
