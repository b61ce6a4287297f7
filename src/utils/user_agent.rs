//! User-Agent classification using woothee.

use crate::domain::entities::DeviceClass;
use woothee::parser::Parser;

const UNKNOWN: &str = "UNKNOWN";

/// Browser, OS and device class derived from a User-Agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub device: DeviceClass,
    pub browser: Option<String>,
    pub os: Option<String>,
}

fn known(value: &str) -> Option<String> {
    (!value.is_empty() && value != UNKNOWN).then(|| value.to_string())
}

/// Classifies a User-Agent string.
///
/// Phones are `Mobile`; everything else, including unparseable or missing agents,
/// counts as `Desktop`.
pub fn classify(user_agent: Option<&str>) -> AgentInfo {
    let Some(result) = user_agent.and_then(|ua| Parser::new().parse(ua)) else {
        return AgentInfo {
            device: DeviceClass::Desktop,
            browser: None,
            os: None,
        };
    };

    let device = match result.category {
        "smartphone" | "mobilephone" => DeviceClass::Mobile,
        _ => DeviceClass::Desktop,
    };

    AgentInfo {
        device,
        browser: known(result.name),
        os: known(result.os),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const WINDOWS_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn test_classify_iphone_as_mobile() {
        let info = classify(Some(IPHONE));
        assert_eq!(info.device, DeviceClass::Mobile);
        assert_eq!(info.os.as_deref(), Some("iPhone"));
        assert_eq!(info.browser.as_deref(), Some("Safari"));
    }

    #[test]
    fn test_classify_desktop_chrome() {
        let info = classify(Some(WINDOWS_CHROME));
        assert_eq!(info.device, DeviceClass::Desktop);
        assert_eq!(info.browser.as_deref(), Some("Chrome"));
        assert!(info.os.is_some());
    }

    #[test]
    fn test_classify_missing_agent() {
        let info = classify(None);
        assert_eq!(info.device, DeviceClass::Desktop);
        assert!(info.browser.is_none());
        assert!(info.os.is_none());
    }
}
