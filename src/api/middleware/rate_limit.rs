//! Rate limiting middleware using token bucket algorithm.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Seconds between replenished requests.
const REPLENISH_SECONDS: u64 = 1;

/// Requests a client may issue in a burst.
const BURST_SIZE: u32 = 30;

fn governor<K>(
    key_extractor: K,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor + Send + Sync + 'static,
{
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .per_second(REPLENISH_SECONDS)
        .burst_size(BURST_SIZE)
        .finish()
        .expect("rate limit quota is non-zero");

    GovernorLayer::new(Arc::new(governor_conf))
}

/// Applies per-client rate limiting to `router`.
///
/// # Limits
///
/// - **Rate**: one request replenished per second
/// - **Burst**: 30 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Resolution
/// requests fan out to third-party hosts, so the budget is tight.
///
/// # Key Extraction
///
/// Clients are keyed by the socket peer address, or by `X-Forwarded-For` /
/// `X-Real-IP` / `Forwarded` when `behind_proxy` is set. The server must be
/// started with `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Example
///
/// ```rust,ignore
/// let api = rate_limit::apply(Router::new().route("/resolve", get(resolve_handler)), false);
/// ```
pub fn apply<S>(router: Router<S>, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(governor(SmartIpKeyExtractor))
    } else {
        router.layer(governor(PeerIpKeyExtractor))
    }
}
