//! Read-through cache wrapper around a resolved redirect store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::entities::{NewResolvedRedirect, ResolvedRedirect};
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Fronts a store with a [`CacheService`].
///
/// # Cache Strategy
///
/// - **lookup**: cache first; on miss read the store and populate the cache
/// - **insert**: write the store, then the cache
/// - **delete / clear**: write the store, then invalidate
/// - **Cache error**: logged, the store answers
///
/// Listing, counting and full-entry reads always go to the store.
pub struct CachedResolvedRedirectRepository<R: ResolvedRedirectRepository + ?Sized> {
    inner: Arc<R>,
    cache: Arc<dyn CacheService>,
}

impl<R: ResolvedRedirectRepository + ?Sized> CachedResolvedRedirectRepository<R> {
    pub fn new(inner: Arc<R>, cache: Arc<dyn CacheService>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<R: ResolvedRedirectRepository + ?Sized> ResolvedRedirectRepository
    for CachedResolvedRedirectRepository<R>
{
    async fn lookup(&self, short_url: &str) -> Result<Option<String>, AppError> {
        match self.cache.get_resolved(short_url).await {
            Ok(Some(resolved)) => return Ok(Some(resolved)),
            Ok(None) => {}
            Err(e) => error!("Cache error: {}", e),
        }

        let resolved = self.inner.lookup(short_url).await?;

        if let Some(ref resolved) = resolved {
            debug!("Store HIT, populating cache");
            if let Err(e) = self.cache.set_resolved(short_url, resolved, None).await {
                error!("Failed to cache resolved redirect: {}", e);
            }
        }

        Ok(resolved)
    }

    async fn find(&self, short_url: &str) -> Result<Option<ResolvedRedirect>, AppError> {
        self.inner.find(short_url).await
    }

    async fn insert(&self, entry: NewResolvedRedirect) -> Result<ResolvedRedirect, AppError> {
        let stored = self.inner.insert(entry).await?;

        if let Err(e) = self
            .cache
            .set_resolved(&stored.short_url, &stored.resolved_url, None)
            .await
        {
            error!("Failed to cache resolved redirect: {}", e);
        }

        Ok(stored)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ResolvedRedirect>, AppError> {
        self.inner.list(offset, limit).await
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.inner.count().await
    }

    async fn delete(&self, short_url: &str) -> Result<bool, AppError> {
        let deleted = self.inner.delete(short_url).await?;

        if let Err(e) = self.cache.invalidate(short_url).await {
            error!("Failed to invalidate cached redirect: {}", e);
        }

        Ok(deleted)
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let removed = self.inner.clear().await?;

        if let Err(e) = self.cache.clear().await {
            error!("Failed to clear redirect cache: {}", e);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockResolvedRedirectRepository;
    use crate::infrastructure::cache::{CacheResult, NullCache};
    use crate::infrastructure::persistence::InMemoryResolvedRedirectRepository;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Map-backed cache standing in for Redis.
    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheService for MapCache {
        async fn get_resolved(&self, short_url: &str) -> CacheResult<Option<String>> {
            Ok(self.entries.lock().await.get(short_url).cloned())
        }

        async fn set_resolved(
            &self,
            short_url: &str,
            resolved_url: &str,
            _ttl_seconds: Option<u64>,
        ) -> CacheResult<()> {
            self.entries
                .lock()
                .await
                .insert(short_url.to_string(), resolved_url.to_string());
            Ok(())
        }

        async fn invalidate(&self, short_url: &str) -> CacheResult<()> {
            self.entries.lock().await.remove(short_url);
            Ok(())
        }

        async fn clear(&self) -> CacheResult<()> {
            self.entries.lock().await.clear();
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn backend(&self) -> &'static str {
            "map"
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let mut store = MockResolvedRedirectRepository::new();
        store.expect_lookup().times(0);

        let cache = Arc::new(MapCache::default());
        cache
            .set_resolved("https://bit.ly/a", "https://example.com", None)
            .await
            .unwrap();

        let repo = CachedResolvedRedirectRepository::new(Arc::new(store), cache);

        let result = repo.lookup("https://bit.ly/a").await.unwrap();
        assert_eq!(result.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn test_store_hit_populates_cache() {
        let store = Arc::new(InMemoryResolvedRedirectRepository::new());
        store
            .insert(NewResolvedRedirect::new("https://bit.ly/a", "https://example.com"))
            .await
            .unwrap();

        let cache = Arc::new(MapCache::default());
        let repo = CachedResolvedRedirectRepository::new(store, cache.clone());

        assert_eq!(
            repo.lookup("https://bit.ly/a").await.unwrap().as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            cache.get_resolved("https://bit.ly/a").await.unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn test_insert_writes_both_layers() {
        let store = Arc::new(InMemoryResolvedRedirectRepository::new());
        let cache = Arc::new(MapCache::default());
        let repo = CachedResolvedRedirectRepository::new(store.clone(), cache.clone());

        repo.insert(NewResolvedRedirect::new("https://t.co/x", "https://x.org"))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            cache.get_resolved("https://t.co/x").await.unwrap().as_deref(),
            Some("https://x.org")
        );
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let store = Arc::new(InMemoryResolvedRedirectRepository::new());
        let cache = Arc::new(MapCache::default());
        let repo = CachedResolvedRedirectRepository::new(store, cache.clone());

        repo.insert(NewResolvedRedirect::new("https://t.co/x", "https://x.org"))
            .await
            .unwrap();
        assert!(repo.delete("https://t.co/x").await.unwrap());

        assert_eq!(cache.get_resolved("https://t.co/x").await.unwrap(), None);
        assert_eq!(repo.lookup("https://t.co/x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_empties_both_layers() {
        let store = Arc::new(InMemoryResolvedRedirectRepository::new());
        let cache = Arc::new(MapCache::default());
        let repo = CachedResolvedRedirectRepository::new(store, cache.clone());

        for i in 0..3 {
            repo.insert(NewResolvedRedirect::new(
                format!("https://t.co/{i}"),
                "https://x.org",
            ))
            .await
            .unwrap();
        }

        assert_eq!(repo.clear().await.unwrap(), 3);
        assert!(cache.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_null_cache_passes_through() {
        let store = Arc::new(InMemoryResolvedRedirectRepository::new());
        let repo = CachedResolvedRedirectRepository::new(store, Arc::new(NullCache::new()));

        repo.insert(NewResolvedRedirect::new("https://t.co/x", "https://x.org"))
            .await
            .unwrap();

        assert_eq!(
            repo.lookup("https://t.co/x").await.unwrap().as_deref(),
            Some("https://x.org")
        );
    }
}
