//! Date-range fetch engine: per-day feed requests with caching, bounded
//! parallelism and retry.
//!
//! # Overview
//!
//! [`FetchEngine`] expands a [`DateRange`](crate::dates::DateRange) into one
//! task per day. Each task checks the [`CacheStore`](crate::cache::CacheStore)
//! first and only goes to the network on a miss, pacing requests through a
//! shared [`RequestPacer`] and retrying transient failures with exponential
//! backoff under a [`RetryPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use fixturefetch_core::{FetchEngine, FetcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = FetchEngine::new(&FetcherConfig::default())?;
//! let start = NaiveDate::from_ymd_opt(2024, 9, 26).ok_or("bad date")?;
//! let end = NaiveDate::from_ymd_opt(2024, 9, 30).ok_or("bad date")?;
//! let documents = engine.fetch_between(start, end).await?;
//! println!("fetched {} days", documents.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod engine;
mod error;
mod pacer;
mod retry;
mod worker;

pub use client::ApiClient;
pub use engine::{EngineError, FetchEngine};
pub use error::FetchError;
pub use pacer::RequestPacer;
pub use retry::{DEFAULT_RETRY_ATTEMPTS, RetryDecision, RetryPolicy};
pub use worker::{FetchOutcome, FetchResult};
