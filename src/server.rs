//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, cache setup, HTTP client construction, and the
//! Axum server lifecycle.

use crate::application::services::{AuthService, RedirectFollower, ResolvedRedirectService};
use crate::config::Config;
use crate::domain::redirect_resolver::RedirectResolver;
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::domain::tracker_rules::TrackerRules;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::http::{ReqwestRedirectResolver, ResolverSettings};
use crate::infrastructure::persistence::{
    CachedResolvedRedirectRepository, InMemoryResolvedRedirectRepository,
    PgResolvedRedirectRepository,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::redact::UrlRedactor;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builds the log redactor from `LOG_REDACT_URLS` and `LOG_HASH_KEY`.
pub fn build_redactor(config: &Config) -> UrlRedactor {
    if !config.redact_urls {
        return UrlRedactor::disabled();
    }

    match &config.log_hash_key {
        Some(key) => UrlRedactor::with_key(key),
        None => UrlRedactor::random(),
    }
}

/// Loads the tracker rule set from `TRACKER_RULES_PATH` or the bundled default.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains an invalid rule.
pub fn load_tracker_rules(config: &Config) -> Result<TrackerRules> {
    let rules = match &config.tracker_rules_path {
        Some(path) => TrackerRules::load(path)
            .with_context(|| format!("Failed to load tracker rules from {}", path.display()))?,
        None => TrackerRules::bundled().context("Bundled tracker rules are invalid")?,
    };

    tracing::info!("Loaded {} tracker rules", rules.len());
    Ok(rules)
}

/// Opens the cache store: PostgreSQL (with migrations) or in-memory.
async fn connect_store(
    config: &Config,
) -> Result<(Arc<dyn ResolvedRedirectRepository>, &'static str)> {
    let Some(database_url) = &config.database_url else {
        tracing::info!("No database configured, resolved redirects are kept in memory");
        return Ok((Arc::new(InMemoryResolvedRedirectRepository::new()), "memory"));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok((
        Arc::new(PgResolvedRedirectRepository::new(Arc::new(pool))),
        "postgres",
    ))
}

/// Connects to Redis, falling back to [`NullCache`] when unset or unreachable.
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Wires every collaborator of the resolution step into an [`AppState`].
///
/// Shared by the HTTP server and the `resolve` CLI.
///
/// # Errors
///
/// Returns an error if the database, tracker rules, or HTTP client cannot be
/// initialised. An unreachable Redis is not an error.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let (store, store_backend) = connect_store(config).await?;
    let cache = connect_cache(config).await;

    let repository: Arc<dyn ResolvedRedirectRepository> =
        Arc::new(CachedResolvedRedirectRepository::new(store, cache.clone()));

    let remote_endpoint = config
        .remote_resolver_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("REMOTE_RESOLVER_URL is not a valid URL")?;

    let resolver = ReqwestRedirectResolver::new(ResolverSettings {
        max_redirects: config.resolve_max_redirects,
        user_agent: config.resolve_user_agent.clone(),
        remote_endpoint,
        remote_token: config.remote_resolver_token.clone(),
    })
    .context("Failed to build HTTP client")?;
    let remote_available = resolver.has_remote();
    let resolver: Arc<dyn RedirectResolver> = Arc::new(resolver);

    let tracker_rules = Arc::new(load_tracker_rules(config)?);

    let redirect_follower = Arc::new(RedirectFollower::new(
        repository.clone(),
        resolver,
        build_redactor(config),
    ));

    Ok(AppState {
        redirect_follower,
        resolved_redirect_service: Arc::new(ResolvedRedirectService::new(repository)),
        auth_service: Arc::new(AuthService::new(config.api_token.clone())),
        tracker_rules,
        defaults: config.resolve_defaults(),
        remote_available,
        cache,
        store_backend,
    })
}

/// Installs the global Prometheus recorder when `METRICS_ENABLED` is on.
fn install_metrics(config: &Config) -> Result<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        tracing::info!("Metrics disabled");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;
    tracing::info!("Metrics exposed at /metrics");
    Ok(Some(handle))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The service would listen on all interfaces without `API_TOKEN`
/// - The metrics recorder cannot be installed
/// - State initialisation fails (see [`build_state`])
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    config.check_exposure()?;

    let metrics = install_metrics(&config)?;
    let state = build_state(&config).await?;

    let app = app_router(state, config.behind_proxy, metrics);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
