//! Helper functions used across the application.
//!
//! - [`code_generator`] - Short code generation
//! - [`url_normalizer`] - Destination URL validation and normalization
//! - [`client_info`] - Client IP, geo and agent headers
//! - [`user_agent`] - Device/browser/OS classification

pub mod client_info;
pub mod code_generator;
pub mod url_normalizer;
pub mod user_agent;
