//! Administration of the resolved redirect cache.

use std::sync::Arc;

use crate::domain::entities::ResolvedRedirect;
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::error::AppError;
use serde_json::json;

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of cache entries together with the total count.
#[derive(Debug, Clone)]
pub struct ResolvedRedirectPage {
    pub items: Vec<ResolvedRedirect>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Service for inspecting and pruning the resolved redirect cache.
pub struct ResolvedRedirectService<R: ResolvedRedirectRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ResolvedRedirectRepository + ?Sized> ResolvedRedirectService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists cache entries, newest first.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed), default 1
    /// - `page_size` - Entries per page (1..=100), default 25
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an out-of-range page or page size.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ResolvedRedirectPage, AppError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(
                format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
                json!({ "page_size": page_size }),
            ));
        }

        let offset = i64::from(page - 1) * i64::from(page_size);

        let items = self.repository.list(offset, i64::from(page_size)).await?;
        let total = self.repository.count().await?;

        Ok(ResolvedRedirectPage {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Returns the cache entry for `short_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry exists.
    pub async fn get(&self, short_url: &str) -> Result<ResolvedRedirect, AppError> {
        self.repository.find(short_url).await?.ok_or_else(|| {
            AppError::not_found("Resolved redirect not found", json!({ "url": short_url }))
        })
    }

    /// Removes the cache entry for `short_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry exists.
    pub async fn delete(&self, short_url: &str) -> Result<(), AppError> {
        if self.repository.delete(short_url).await? {
            tracing::info!("Removed resolved redirect from cache");
            Ok(())
        } else {
            Err(AppError::not_found(
                "Resolved redirect not found",
                json!({ "url": short_url }),
            ))
        }
    }

    /// Removes every cache entry and returns how many were removed.
    pub async fn clear(&self) -> Result<u64, AppError> {
        let removed = self.repository.clear().await?;
        tracing::info!("Cleared {} resolved redirects", removed);
        Ok(removed)
    }

    /// Counts cache entries. Also used as the store health probe.
    pub async fn count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }
}
