//! Short link entity.

use chrono::{DateTime, Utc};

/// A durable short link record.
///
/// Everything except `clicks` is immutable after creation. `clicks` is written only
/// by the analytics sync, which overwrites it with the real-time cache counter.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortLink {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub creator_ip: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        original_url: String,
        short_code: String,
        creator_ip: String,
        clicks: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_url,
            short_code,
            creator_ip,
            clicks,
            created_at,
        }
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub original_url: String,
    pub short_code: String,
    pub creator_ip: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_creation() {
        let now = Utc::now();
        let link = ShortLink::new(
            1,
            "https://example.com/page".to_string(),
            "abc123".to_string(),
            "10.0.0.1".to_string(),
            0,
            now,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.short_code, "abc123");
        assert_eq!(link.original_url, "https://example.com/page");
        assert_eq!(link.clicks, 0);
        assert_eq!(link.created_at, now);
    }
}
