//! Repository implementations.
//!
//! PostgreSQL implementations of domain repository traits use SQLx with bound
//! parameters. [`MemoryStore`] implements all of them in RAM.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Short link storage and click totals
//! - [`PgClickLogRepository`] - Sampled click details
//! - [`PgSettingsRepository`] - Admin settings row
//! - [`MemoryStore`] - In-memory store for tests and local runs

pub mod memory;
pub mod pg_click_log_repository;
pub mod pg_link_repository;
pub mod pg_settings_repository;

pub use memory::MemoryStore;
pub use pg_click_log_repository::PgClickLogRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_settings_repository::PgSettingsRepository;
