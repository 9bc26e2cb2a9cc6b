//! Outgoing HTTP used to resolve redirects.
//!
//! - [`ReqwestRedirectResolver`] - reqwest implementation of
//!   [`crate::domain::redirect_resolver::RedirectResolver`]
//! - [`ResolverSettings`] - Client construction options

mod reqwest_resolver;

pub use reqwest_resolver::{ReqwestRedirectResolver, ResolverSettings};
