//! Business logic services for the application layer.

pub mod auth_service;
pub mod redirect_follower;
pub mod resolved_redirect_service;

pub use auth_service::AuthService;
pub use redirect_follower::RedirectFollower;
pub use resolved_redirect_service::{ResolvedRedirectPage, ResolvedRedirectService};
