//! Shared application state.
//!
//! [`AppState`] is assembled once from [`Backends`] (the cache, the repositories and
//! the task spawner) and [`RuntimeOptions`]. Every service receives its collaborators
//! explicitly, so the same wiring runs over Redis/PostgreSQL in production and over
//! in-memory backends in tests.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::redirect_service::DEFAULT_LOOKUP_TIMEOUT;
use crate::application::services::{
    AnalyticsSync, LinkService, RateLimiter, RedirectService, SettingsService, StatsService,
};
use crate::config::Config;
use crate::domain::click_sampler::{ClickSampler, DEFAULT_SAMPLE_RATE};
use crate::domain::repositories::{ClickLogRepository, LinkRepository, SettingsRepository};
use crate::domain::reserved_paths::ReservedPaths;
use crate::infrastructure::cache::{CacheService, MemoryCache};
use crate::infrastructure::persistence::MemoryStore;
use crate::infrastructure::tasks::TaskSpawner;

/// External collaborators, constructed once per process.
#[derive(Clone)]
pub struct Backends {
    pub cache: Arc<dyn CacheService>,
    pub links: Arc<dyn LinkRepository>,
    pub click_logs: Arc<dyn ClickLogRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub spawner: Arc<dyn TaskSpawner>,
}

impl Backends {
    /// Backends over an in-memory cache and store.
    pub fn in_memory(
        cache: Arc<MemoryCache>,
        store: Arc<MemoryStore>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            cache,
            links: store.clone(),
            click_logs: store.clone(),
            settings: store,
            spawner,
        }
    }
}

/// Tunables that shape service behaviour.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub sample_rate: f64,
    /// Fixed seed for the click sampler; `None` draws from the thread RNG.
    pub sample_seed: Option<u64>,
    pub daily_limit: i64,
    pub enforce_rate_limit: bool,
    pub batch_size: usize,
    pub cache_timeout: Duration,
    pub reserved_paths: Vec<String>,
    pub base_url: String,
    pub behind_proxy: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            sample_seed: None,
            daily_limit: crate::application::services::rate_limiter::DEFAULT_DAILY_LIMIT,
            enforce_rate_limit: false,
            batch_size: crate::application::services::analytics_sync::DEFAULT_BATCH_SIZE,
            cache_timeout: DEFAULT_LOOKUP_TIMEOUT,
            reserved_paths: crate::domain::reserved_paths::DEFAULT_RESERVED
                .iter()
                .map(|s| s.to_string())
                .collect(),
            base_url: "http://localhost:3000".to_string(),
            behind_proxy: false,
        }
    }
}

impl From<&Config> for RuntimeOptions {
    fn from(config: &Config) -> Self {
        Self {
            sample_rate: config.sample_rate,
            sample_seed: None,
            daily_limit: config.daily_link_limit,
            enforce_rate_limit: config.enforce_rate_limit(),
            batch_size: config.sync_batch_size,
            cache_timeout: config.cache_timeout(),
            reserved_paths: config.reserved_paths.clone(),
            base_url: config.base_url.clone(),
            behind_proxy: config.behind_proxy,
        }
    }
}

/// State injected into every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn CacheService>,
    pub links: Arc<dyn LinkRepository>,
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub analytics_sync: Arc<AnalyticsSync>,
    pub settings_service: Arc<SettingsService>,
    pub stats_service: Arc<StatsService>,
    /// Read client IPs from proxy headers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(backends: Backends, options: RuntimeOptions) -> Self {
        let Backends {
            cache,
            links,
            click_logs,
            settings,
            spawner,
        } = backends;

        let reserved = Arc::new(ReservedPaths::new(&options.reserved_paths));

        let sampler = Arc::new(match options.sample_seed {
            Some(seed) => ClickSampler::seeded(options.sample_rate, seed),
            None => ClickSampler::new(options.sample_rate),
        });

        let link_service = Arc::new(LinkService::new(
            links.clone(),
            cache.clone(),
            RateLimiter::new(cache.clone(), options.daily_limit),
            options.enforce_rate_limit,
            reserved.clone(),
            options.base_url,
        ));

        let redirect_service = Arc::new(RedirectService::new(
            cache.clone(),
            sampler,
            spawner,
            reserved,
            options.cache_timeout,
        ));

        let analytics_sync = Arc::new(AnalyticsSync::new(
            cache.clone(),
            links.clone(),
            click_logs.clone(),
            options.batch_size,
        ));

        let settings_service = Arc::new(SettingsService::new(cache.clone(), settings));
        let stats_service = Arc::new(StatsService::new(cache.clone(), links.clone(), click_logs));

        Self {
            cache,
            links,
            link_service,
            redirect_service,
            analytics_sync,
            settings_service,
            stats_service,
            behind_proxy: options.behind_proxy,
        }
    }
}
