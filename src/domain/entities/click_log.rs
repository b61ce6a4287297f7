//! Sampled click detail record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse device class derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Desktop => "Desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mobile" => Ok(DeviceClass::Mobile),
            "Desktop" => Ok(DeviceClass::Desktop),
            other => Err(format!("unknown device class: {other}")),
        }
    }
}

/// A sampled click persisted by the analytics sync.
///
/// One row per processed queue entry. Rows are never updated; because detailed
/// analytics are sampled, counts over these rows are statistical estimates while
/// [`crate::domain::entities::ShortLink::clicks`] stays exact.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickLog {
    pub id: i64,
    pub short_link_id: i64,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub referrer: String,
    pub country: String,
    pub city: String,
    pub device: DeviceClass,
    pub os: Option<String>,
    pub browser: Option<String>,
    pub clicked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input data for recording a sampled click.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClickLog {
    pub short_link_id: i64,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub referrer: String,
    pub country: String,
    pub city: String,
    pub device: DeviceClass,
    pub os: Option<String>,
    pub browser: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// A click log attribute that reports can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDimension {
    Country,
    Device,
    Referrer,
    Browser,
}

impl ClickDimension {
    /// Storage column backing this dimension.
    pub fn column(&self) -> &'static str {
        match self {
            ClickDimension::Country => "country",
            ClickDimension::Device => "device",
            ClickDimension::Referrer => "referrer",
            ClickDimension::Browser => "browser",
        }
    }

    /// Label reported when the attribute is missing or empty.
    pub fn fallback(&self) -> &'static str {
        match self {
            ClickDimension::Referrer => "Direct",
            _ => "Unknown",
        }
    }

    /// Reads this dimension from a stored click.
    pub fn value_of(&self, log: &ClickLog) -> String {
        let raw = match self {
            ClickDimension::Country => Some(log.country.as_str()),
            ClickDimension::Device => Some(log.device.as_str()),
            ClickDimension::Referrer => Some(log.referrer.as_str()),
            ClickDimension::Browser => log.browser.as_deref(),
        };

        match raw {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => self.fallback().to_string(),
        }
    }
}

/// Number of sampled clicks sharing one attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_round_trips_through_str() {
        assert_eq!("Mobile".parse::<DeviceClass>(), Ok(DeviceClass::Mobile));
        assert_eq!(DeviceClass::Desktop.to_string(), "Desktop");
        assert!("Tablet".parse::<DeviceClass>().is_err());
    }

    #[test]
    fn test_dimension_falls_back_for_missing_values() {
        let log = ClickLog {
            id: 1,
            short_link_id: 1,
            ip_address: "10.0.0.1".into(),
            user_agent: None,
            referrer: String::new(),
            country: "KR".into(),
            city: "Seoul".into(),
            device: DeviceClass::Mobile,
            os: None,
            browser: None,
            clicked_at: Utc::now(),
            created_at: Utc::now(),
        };

        assert_eq!(ClickDimension::Country.value_of(&log), "KR");
        assert_eq!(ClickDimension::Device.value_of(&log), "Mobile");
        assert_eq!(ClickDimension::Referrer.value_of(&log), "Direct");
        assert_eq!(ClickDimension::Browser.value_of(&log), "Unknown");
    }
}
