//! Business logic services for the application layer.

pub mod analytics_sync;
pub mod link_service;
pub mod rate_limiter;
pub mod redirect_service;
pub mod settings_service;
pub mod stats_service;

pub use analytics_sync::{AnalyticsSync, SyncOutcome, SyncReport};
pub use link_service::LinkService;
pub use rate_limiter::RateLimiter;
pub use redirect_service::RedirectService;
pub use settings_service::SettingsService;
pub use stats_service::StatsService;
