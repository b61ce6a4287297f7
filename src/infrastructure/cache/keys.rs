//! Cache key space shared by the redirect path, rate limiter and sync worker.

/// List of serialized click payloads awaiting durable persistence.
pub const ANALYTICS_QUEUE: &str = "analytics_queue";

/// Cached copy of the ad redirect setting.
pub const AD_REDIRECT_URL: &str = "ad_redirect_url";

/// Lock key guarding against overlapping analytics sync runs.
pub const SYNC_LOCK: &str = "analytics_sync_lock";

/// Destination URL for a short code. Never expires.
pub fn short_url(code: &str) -> String {
    format!("short:{code}")
}

/// Real-time click counter for a short code.
pub fn clicks(code: &str) -> String {
    format!("clicks:{code}")
}

/// Daily link-creation counter for a client.
pub fn rate(client_key: &str) -> String {
    format!("rate:{client_key}")
}
