//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, the background analytics sync, and the
//! Axum server lifecycle.

use crate::config::Config;
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::persistence::{
    PgClickLogRepository, PgLinkRepository, PgSettingsRepository,
};
use crate::infrastructure::tasks::TokioSpawner;
use crate::routes::app_router;
use crate::state::{AppState, Backends, RuntimeOptions};

use anyhow::{Context, Result, bail};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (in-memory fallback outside production)
/// - Periodic analytics sync, when an interval is configured
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Redis is unavailable in production
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let cache = connect_cache(&config).await?;

    let pool = Arc::new(pool);
    let backends = Backends {
        cache,
        links: Arc::new(PgLinkRepository::new(pool.clone())),
        click_logs: Arc::new(PgClickLogRepository::new(pool.clone())),
        settings: Arc::new(PgSettingsRepository::new(pool)),
        spawner: Arc::new(TokioSpawner),
    };

    let state = AppState::new(backends, RuntimeOptions::from(&config));

    let sync_task = config.sync_interval().map(|interval| {
        tracing::info!(interval_secs = interval.as_secs(), "Periodic analytics sync started");
        tokio::spawn(state.analytics_sync.clone().run_periodic(interval))
    });

    let app = NormalizePathLayer::trim_trailing_slash().layer(app_router(state, config.behind_proxy));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(task) = sync_task {
        task.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Connects to Redis. Outside production a missing or unreachable Redis falls back
/// to the in-process cache; in production it is fatal.
async fn connect_cache(config: &Config) -> Result<Arc<dyn CacheService>> {
    let production = config.app_env.is_production();

    let Some(redis_url) = &config.redis_url else {
        if production {
            bail!("REDIS_URL is required in production");
        }
        tracing::info!("Cache: in-memory (Redis not configured)");
        return Ok(Arc::new(MemoryCache::new()));
    };

    match RedisCache::connect(redis_url).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Ok(Arc::new(redis))
        }
        Err(e) if !production => {
            tracing::warn!("Failed to connect to Redis: {}. Using in-memory cache.", e);
            Ok(Arc::new(MemoryCache::new()))
        }
        Err(e) => Err(e).context("Failed to connect to Redis"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
