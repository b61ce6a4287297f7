//! Core domain entities.
//!
//! Entities are plain data; creation inputs live next to them as `New*` structs.
//!
//! - [`ShortLink`] - a short code and its destination, plus the reconciled click total
//! - [`ClickLog`] - one sampled click with parsed client details

pub mod click_log;
pub mod link;

pub use click_log::{ClickDimension, ClickLog, DeviceClass, NewClickLog, ValueCount};
pub use link::{NewShortLink, ShortLink};
