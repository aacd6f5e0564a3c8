//! Storage health checks with a short-lived cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parcel_storage::ObjectStore;
use tokio::sync::RwLock;

use crate::TRACING_TARGET_HEALTH;

/// Default cache duration for health checks.
const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct HealthCacheEntry {
    is_healthy: AtomicBool,
    last_check: RwLock<Option<Instant>>,
    cache_duration: Duration,
}

impl HealthCacheEntry {
    fn new(cache_duration: Duration) -> Self {
        Self {
            is_healthy: AtomicBool::new(false),
            last_check: RwLock::new(None),
            cache_duration,
        }
    }

    async fn get_or_update<F, Fut>(&self, check_fn: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        let now = Instant::now();
        let last_check = *self.last_check.read().await;

        if let Some(last_check) = last_check
            && now.duration_since(last_check) < self.cache_duration
        {
            return self.is_healthy.load(Ordering::Relaxed);
        }

        let healthy = check_fn().await;
        self.is_healthy.store(healthy, Ordering::Relaxed);
        *self.last_check.write().await = Some(now);

        healthy
    }
}

/// Reports whether the bucket is reachable through the gateway.
#[derive(Clone)]
pub struct HealthMonitor {
    store: Arc<dyn ObjectStore>,
    bucket: Arc<str>,
    cache: Arc<HealthCacheEntry>,
}

impl HealthMonitor {
    /// Creates a monitor for `bucket` with the default cache duration.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<Arc<str>>) -> Self {
        Self::with_cache_duration(store, bucket, DEFAULT_CACHE_DURATION)
    }

    /// Creates a monitor that reuses a result for `cache_duration`.
    pub fn with_cache_duration(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<Arc<str>>,
        cache_duration: Duration,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            cache: Arc::new(HealthCacheEntry::new(cache_duration)),
        }
    }

    /// Returns `true` when the bucket exists and the store answered.
    pub async fn is_healthy(&self) -> bool {
        self.cache.get_or_update(|| self.check_bucket()).await
    }

    async fn check_bucket(&self) -> bool {
        match self.store.bucket_exists(&self.bucket).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(
                    target: TRACING_TARGET_HEALTH,
                    bucket = %self.bucket,
                    "bucket does not exist"
                );
                false
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_HEALTH,
                    bucket = %self.bucket,
                    error = %error,
                    "storage health check failed"
                );
                false
            }
        }
    }
}
