//! Read-through dataset cache using moka
//!
//! Snapshots are keyed by source and expire after a staleness window, after
//! which the next read reloads the sheet. A stale read inside the window is
//! expected behaviour.

use crate::dataset::Dataset;
use crate::error::LoadResult;
use crate::loader::DataSource;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default staleness window
pub const DEFAULT_STALENESS: Duration = Duration::from_secs(30);

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of cached snapshots
    pub entry_count: u64,
}

/// Time-bounded cache of loaded snapshots
#[derive(Debug, Clone)]
pub struct DatasetCache {
    inner: Cache<String, Arc<Dataset>>,
    staleness: Duration,
}

impl DatasetCache {
    /// Create cache with the given staleness window
    #[must_use]
    pub fn new(staleness: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(16)
                .time_to_live(staleness)
                .build(),
            staleness,
        }
    }

    /// Staleness window
    #[inline]
    #[must_use]
    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    /// Snapshot for `source`, loading it if absent or expired
    pub async fn load(&self, source: &DataSource) -> LoadResult<Arc<Dataset>> {
        self.try_get_or_insert_with(source.cache_key(), || source.load())
            .await
    }

    /// Get cached snapshot or compute it
    ///
    /// Failed loads are not cached.
    pub async fn try_get_or_insert_with<E, F, Fut>(
        &self,
        key: String,
        f: F,
    ) -> Result<Arc<Dataset>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Dataset, E>>,
    {
        if let Some(cached) = self.inner.get(&key).await {
            tracing::debug!(source = %key, rows = cached.len(), "dataset cache hit");
            return Ok(cached);
        }

        let dataset = Arc::new(f().await?);
        tracing::info!(source = %key, rows = dataset.len(), "loaded dataset");
        self.inner.insert(key, Arc::clone(&dataset)).await;

        Ok(dataset)
    }

    /// Drop every cached snapshot
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS)
    }
}
