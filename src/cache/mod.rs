//! Disk-backed response cache keyed by canonical date string.
//!
//! Each cached day is one plain UTF-8 `.xml` file under the cache directory,
//! named from its cache key. The format is deliberately inspectable: a cached
//! entry can be opened in an editor or diffed against a live response.
//!
//! Read failures are never fatal. A missing, unreadable, or corrupt entry is
//! reported as absence so the caller falls through to a network fetch. Write
//! failures are surfaced as errors but callers treat them as non-fatal too:
//! the fetched content is still returned even when persistence fails.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// File extension for cache entries.
const ENTRY_EXTENSION: &str = "xml";

/// File extension of in-flight temp files, renamed into place on success.
const TEMP_EXTENSION: &str = "tmp";

/// Errors from cache store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory could not be created or is not writable.
    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        /// Directory that failed to initialize.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A cache entry could not be written.
    #[error("cannot write cache entry {key}: {source}")]
    Write {
        /// Cache key of the failed entry.
        key: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Entry files could not be enumerated or removed during `clear`.
    #[error("cannot clear cache at {path}: {source}")]
    Clear {
        /// Cache directory being cleared.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// File-per-key cache store, durable across process restarts.
///
/// Entries are created on first successful fetch for a date, read on every
/// subsequent request, and never expire. Writes go to a temp file which is
/// then renamed over the entry, so concurrent writers to the same key settle
/// as last-write-wins without torn files.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Opens a cache store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::CreateDir`] if the directory cannot be created.
    /// A non-writable cache directory is a configuration error and aborts
    /// before any fetching begins.
    #[instrument(level = "debug", fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| CacheError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        debug!("cache store ready");
        Ok(Self { dir })
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Looks up a cached entry by key.
    ///
    /// Returns `None` for missing entries, and also for entries that cannot
    /// be read or are empty; a corrupt entry is logged and treated exactly
    /// like a miss so the caller falls through to the network.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.is_empty() => {
                warn!(key, "cache entry is empty, treating as miss");
                None
            }
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry, treating as miss");
                None
            }
        }
    }

    /// Stores an entry under `key`, replacing any previous content wholesale.
    ///
    /// The content is written to a sibling temp file and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Write`] if the entry cannot be persisted. The
    /// caller logs this and keeps the in-memory content.
    #[instrument(level = "debug", skip(self, content), fields(bytes = content.len()))]
    pub async fn put(&self, key: &str, content: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let tmp = path.with_extension(format!("{ENTRY_EXTENSION}.{TEMP_EXTENSION}"));

        let write_err = |source| CacheError::Write {
            key: key.to_string(),
            source,
        };
        tokio::fs::write(&tmp, content).await.map_err(write_err)?;
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            // Don't leave the temp file behind on a failed replace.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(source));
        }

        debug!(key, "cache entry written");
        Ok(())
    }

    /// Removes every cache entry, returning how many were deleted.
    ///
    /// Orphaned `.tmp` files from interrupted writes are swept as well but
    /// not counted; the co-located log file survives.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Clear`] if the directory cannot be read or an
    /// entry cannot be removed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let clear_err = |source| CacheError::Clear {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(clear_err)?;
        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await.map_err(clear_err)? {
            let path = entry.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some(ENTRY_EXTENSION) => {
                    tokio::fs::remove_file(&path).await.map_err(clear_err)?;
                    removed += 1;
                }
                Some(TEMP_EXTENSION) => {
                    // Orphan from a write interrupted between temp and rename.
                    tokio::fs::remove_file(&path).await.map_err(clear_err)?;
                }
                _ => {}
            }
        }

        debug!(removed, "cache cleared");
        Ok(removed)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }
}
