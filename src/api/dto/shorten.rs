//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be an absolute URL).
    #[validate(url(message = "Invalid URL provided"))]
    pub url: String,
}

/// A newly created short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
}

impl ShortenResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            short_code: link.short_code,
            short_url,
            original_url: link.original_url,
        }
    }
}
