//! Client details extracted from HTTP request headers.

use axum::http::{HeaderMap, header};
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const COUNTRY_HEADERS: &[&str] = &["x-vercel-ip-country", "cf-ipcountry", "x-country"];
const CITY_HEADERS: &[&str] = &["x-vercel-ip-city", "x-city"];

/// Returns the first non-empty value among `names`.
fn first_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Resolves the client IP address.
///
/// When `trust_proxy` is set, the left-most `X-Forwarded-For` entry wins, then
/// `X-Real-IP`; otherwise only the socket peer address is used.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
/// assert_eq!(client_ip(&headers, None, true).as_deref(), Some("203.0.113.7"));
/// ```
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if let Some(ip) = forwarded.or_else(|| first_header(headers, &[REAL_IP])) {
            return Some(ip);
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

/// Platform-provided country code, if any.
pub fn geo_country(headers: &HeaderMap) -> Option<String> {
    first_header(headers, COUNTRY_HEADERS)
}

/// Platform-provided city name, if any.
pub fn geo_city(headers: &HeaderMap) -> Option<String> {
    first_header(headers, CITY_HEADERS)
}

/// Raw `User-Agent` header.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    first_header(headers, &[header::USER_AGENT.as_str()])
}

/// Raw `Referer` header.
pub fn referrer(headers: &HeaderMap) -> Option<String> {
    first_header(headers, &[header::REFERER.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("127.0.0.1:4000".parse().unwrap())
    }

    #[test]
    fn test_client_ip_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        assert_eq!(
            client_ip(&headers, peer(), true).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_client_ip_ignores_headers_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.7"));

        assert_eq!(
            client_ip(&headers, peer(), false).as_deref(),
            Some("127.0.0.1")
        );
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            client_ip(&headers, peer(), true).as_deref(),
            Some("127.0.0.1")
        );

        headers.insert(REAL_IP, HeaderValue::from_static("198.51.100.2"));
        assert_eq!(
            client_ip(&headers, peer(), true).as_deref(),
            Some("198.51.100.2")
        );

        assert!(client_ip(&HeaderMap::new(), None, true).is_none());
    }

    #[test]
    fn test_geo_headers() {
        let mut headers = HeaderMap::new();
        assert!(geo_country(&headers).is_none());

        headers.insert("x-country", HeaderValue::from_static("DE"));
        headers.insert("x-vercel-ip-city", HeaderValue::from_static("Berlin"));

        assert_eq!(geo_country(&headers).as_deref(), Some("DE"));
        assert_eq!(geo_city(&headers).as_deref(), Some("Berlin"));
    }
}
