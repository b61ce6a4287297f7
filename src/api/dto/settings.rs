//! DTOs for the ad redirect setting.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AdSettingsRequest {
    #[validate(url(message = "Invalid URL provided"))]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AdSettingsResponse {
    pub url: String,
}
