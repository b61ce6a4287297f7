//! Repository trait definitions for the domain layer.
//!
//! These traits describe the durable store as the core consumes it. Implementations
//! live in `crate::infrastructure::persistence`; mocks are generated via `mockall`
//! for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - short links and their reconciled click totals
//! - [`ClickLogRepository`] - sampled click details
//! - [`SettingsRepository`] - admin settings with cache fallback semantics

pub mod click_log_repository;
pub mod link_repository;
pub mod settings_repository;

pub use click_log_repository::ClickLogRepository;
pub use link_repository::LinkRepository;
pub use settings_repository::SettingsRepository;

#[cfg(test)]
pub use click_log_repository::MockClickLogRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
