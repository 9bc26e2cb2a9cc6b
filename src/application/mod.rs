//! Application layer services implementing business logic.
//!
//! Services consume domain traits and provide a clean API for HTTP handlers
//! and the CLI.
//!
//! # Available Services
//!
//! - [`services::redirect_follower::RedirectFollower`] - The redirect resolution step
//! - [`services::resolved_redirect_service::ResolvedRedirectService`] - Cache listing and pruning
//! - [`services::auth_service::AuthService`] - API bearer token check

pub mod services;
