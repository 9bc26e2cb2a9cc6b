//! DTOs for cache administration endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::application::services::ResolvedRedirectPage;
use crate::domain::entities::ResolvedRedirect;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// `?url=` selector for a single cache entry.
#[derive(Debug, Deserialize, Validate)]
pub struct CacheUrlQuery {
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CacheEntryDto {
    pub url: String,
    pub resolved_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<ResolvedRedirect> for CacheEntryDto {
    fn from(entry: ResolvedRedirect) -> Self {
        Self {
            url: entry.short_url,
            resolved_url: entry.resolved_url,
            created_at: entry.created_at,
        }
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

/// Paginated list of cache entries.
#[derive(Debug, Serialize)]
pub struct CacheListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<CacheEntryDto>,
}

impl From<ResolvedRedirectPage> for CacheListResponse {
    fn from(page: ResolvedRedirectPage) -> Self {
        let page_size = i64::from(page.page_size);
        let total_pages = (page.total.max(0) + page_size - 1) / page_size;

        Self {
            pagination: PaginationMeta {
                page: page.page,
                page_size: page.page_size,
                total_items: page.total,
                total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            },
            items: page.items.into_iter().map(CacheEntryDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub removed: u64,
}
