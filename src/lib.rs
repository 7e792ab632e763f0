//! Fixturefetch Core Library
//!
//! Date-range acquisition engine for school sports fixture data: given a
//! start and end date it retrieves one feed document per calendar day,
//! serving repeat requests from a persistent on-disk cache, fanning cold
//! fetches out across a bounded worker pool, and retrying transient network
//! failures with exponential backoff.
//!
//! # Architecture
//!
//! - [`dates`] - Date ranges and canonical cache keys
//! - [`cache`] - File-per-date response cache
//! - [`fetch`] - Feed client, retry, pacing and the range engine
//! - [`stats`] - Run counters shared across workers
//! - [`aggregate`] - Chronological consolidation of fetched documents

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dates;
pub mod fetch;
pub mod stats;

// Re-export commonly used types
pub use aggregate::{AggregateError, Consolidated, consolidate};
pub use cache::{CacheError, CacheStore};
pub use config::FetcherConfig;
pub use dates::{DateRange, InvalidRange, cache_key, feed_date};
pub use fetch::{
    ApiClient, DEFAULT_RETRY_ATTEMPTS, EngineError, FetchEngine, FetchError, FetchOutcome,
    FetchResult, RequestPacer, RetryDecision, RetryPolicy,
};
pub use stats::{FetchStats, StatsSnapshot};
