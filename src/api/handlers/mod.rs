//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod cache;
pub mod health;
pub mod metrics;
pub mod resolve;

pub use cache::{
    cache_clear_handler, cache_delete_handler, cache_list_handler, cache_lookup_handler,
};
pub use health::health_handler;
pub use self::metrics::metrics_handler;
pub use resolve::{resolve_batch_handler, resolve_handler};
