//! HTTP middleware for request processing and protection.
//!
//! Provides the short link redirect interceptor and per-IP rate limiting.

pub mod rate_limit;
pub mod short_link;
