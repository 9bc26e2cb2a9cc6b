//! Core domain entities.
//!
//! - [`ResolvedRedirect`] - A cached mapping from an original URL to its destination
//! - [`NewResolvedRedirect`] - Input for writing a cache entry

pub mod resolved_redirect;

pub use resolved_redirect::{NewResolvedRedirect, ResolvedRedirect};
