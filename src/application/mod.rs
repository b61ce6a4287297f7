//! Application layer services implementing business logic.
//!
//! Services orchestrate the cache, the durable store and the domain rules. They
//! hold their collaborators as trait objects so HTTP handlers, the admin CLI and
//! tests can share them over real or in-memory backends.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation
//! - [`services::rate_limiter::RateLimiter`] - Daily per-client creation ceiling
//! - [`services::redirect_service::RedirectService`] - Code resolution and click telemetry
//! - [`services::analytics_sync::AnalyticsSync`] - Queue drain and click reconciliation
//! - [`services::settings_service::SettingsService`] - Ad redirect setting
//! - [`services::stats_service::StatsService`] - Reporting

pub mod services;
