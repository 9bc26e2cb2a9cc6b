//! In-memory implementation of the resolved redirect repository.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{NewResolvedRedirect, ResolvedRedirect};
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::error::AppError;

/// Process-local store keyed by original URL.
///
/// Used when no database is configured, by the CLI, and by integration tests.
/// Entries are lost when the process exits.
#[derive(Default)]
pub struct InMemoryResolvedRedirectRepository {
    entries: RwLock<HashMap<String, ResolvedRedirect>>,
}

impl InMemoryResolvedRedirectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResolvedRedirectRepository for InMemoryResolvedRedirectRepository {
    async fn lookup(&self, short_url: &str) -> Result<Option<String>, AppError> {
        let entries = self.entries.read().await;
        Ok(entries.get(short_url).map(|e| e.resolved_url.clone()))
    }

    async fn find(&self, short_url: &str) -> Result<Option<ResolvedRedirect>, AppError> {
        let entries = self.entries.read().await;
        Ok(entries.get(short_url).cloned())
    }

    async fn insert(&self, entry: NewResolvedRedirect) -> Result<ResolvedRedirect, AppError> {
        let stored = ResolvedRedirect::new(entry.short_url, entry.resolved_url, Utc::now());

        let mut entries = self.entries.write().await;
        entries.insert(stored.short_url.clone(), stored.clone());

        Ok(stored)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ResolvedRedirect>, AppError> {
        let entries = self.entries.read().await;

        let mut all: Vec<ResolvedRedirect> = entries.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.short_url.cmp(&b.short_url))
        });

        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.entries.read().await.len() as i64)
    }

    async fn delete(&self, short_url: &str) -> Result<bool, AppError> {
        Ok(self.entries.write().await.remove(short_url).is_some())
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }
}
