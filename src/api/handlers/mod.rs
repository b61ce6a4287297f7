//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod settings;
pub mod shorten;
pub mod stats;
pub mod sync;

pub use health::health_handler;
pub use settings::{get_ad_settings_handler, update_ad_settings_handler};
pub use shorten::shorten_handler;
pub use stats::{analytics_handler, link_stats_handler, overview_handler};
pub use sync::sync_handler;
