//! First path segments that are never treated as short codes.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid short code pattern"));

/// Segments reserved for application routes and static assets.
pub const DEFAULT_RESERVED: &[&str] = &[
    "api",
    "admin",
    "health",
    "static",
    "result",
    "login",
    "_next",
    "favicon.ico",
    "robots.txt",
];

/// Case-insensitive set of reserved first path segments.
#[derive(Debug, Clone)]
pub struct ReservedPaths {
    segments: HashSet<String>,
}

impl ReservedPaths {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| s.as_ref().trim().trim_matches('/').to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, segment: &str) -> bool {
        segment.is_empty() || self.segments.contains(&segment.to_ascii_lowercase())
    }

    /// Extracts the candidate short code from a request path.
    ///
    /// Returns `None` for the root path, reserved segments and segments that cannot
    /// be short codes.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let reserved = ReservedPaths::default();
    /// assert_eq!(reserved.candidate_code("/abc123"), Some("abc123"));
    /// assert_eq!(reserved.candidate_code("/api/shorten"), None);
    /// ```
    pub fn candidate_code<'a>(&self, path: &'a str) -> Option<&'a str> {
        let segment = path.trim_start_matches('/').split('/').next().unwrap_or("");

        if self.contains(segment) || !CODE_PATTERN.is_match(segment) {
            return None;
        }

        Some(segment)
    }
}

impl Default for ReservedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED)
    }
}
