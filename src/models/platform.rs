// src/models/platform.rs

//! Supported short-video platforms and host-based detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A short-video platform, serialized by its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "抖音")]
    Douyin,
    #[serde(rename = "快手")]
    Kuaishou,
    #[serde(rename = "小红书")]
    Xiaohongshu,
    #[serde(rename = "TikTok")]
    TikTok,
    #[serde(rename = "未知")]
    Unknown,
}

/// Host suffixes owned by each platform, checked in order.
const HOST_TABLE: &[(&str, Platform)] = &[
    ("douyin.com", Platform::Douyin),
    ("iesdouyin.com", Platform::Douyin),
    ("kuaishou.com", Platform::Kuaishou),
    ("chenzhongtech.com", Platform::Kuaishou),
    ("xiaohongshu.com", Platform::Xiaohongshu),
    ("xhslink.com", Platform::Xiaohongshu),
    ("tiktok.com", Platform::TikTok),
];

impl Platform {
    /// Classify a URL by its host.
    ///
    /// Unparseable input falls back to substring matching on the raw text.
    pub fn detect(url: &str) -> Self {
        match url::Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
            Some(host) => HOST_TABLE
                .iter()
                .find(|(suffix, _)| host == *suffix || host.ends_with(&format!(".{suffix}")))
                .map(|(_, platform)| *platform)
                .unwrap_or(Platform::Unknown),
            None => HOST_TABLE
                .iter()
                .find(|(suffix, _)| url.contains(suffix))
                .map(|(_, platform)| *platform)
                .unwrap_or(Platform::Unknown),
        }
    }

    pub fn is_supported(self) -> bool {
        self != Platform::Unknown
    }

    /// Display name used in API payloads.
    pub fn label(self) -> &'static str {
        match self {
            Platform::Douyin => "抖音",
            Platform::Kuaishou => "快手",
            Platform::Xiaohongshu => "小红书",
            Platform::TikTok => "TikTok",
            Platform::Unknown => "未知",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_hosts() {
        assert_eq!(Platform::detect("https://v.douyin.com/abc123/"), Platform::Douyin);
        assert_eq!(
            Platform::detect("https://www.iesdouyin.com/share/video/1/"),
            Platform::Douyin
        );
        assert_eq!(Platform::detect("https://v.kuaishou.com/xyz"), Platform::Kuaishou);
        assert_eq!(Platform::detect("http://xhslink.com/a/b"), Platform::Xiaohongshu);
        assert_eq!(
            Platform::detect("https://www.tiktok.com/@u/video/1"),
            Platform::TikTok
        );
    }

    #[test]
    fn test_detect_unknown_host() {
        assert_eq!(Platform::detect("https://example.com/video/1"), Platform::Unknown);
        assert_eq!(
            Platform::detect("https://notdouyin.com.evil.io/x"),
            Platform::Unknown
        );
        assert!(!Platform::Unknown.is_supported());
    }

    #[test]
    fn test_query_mention_does_not_match() {
        assert_eq!(
            Platform::detect("https://example.com/?from=douyin.com"),
            Platform::Unknown
        );
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Platform::Douyin).unwrap();
        assert_eq!(json, "\"抖音\"");
        let back: Platform = serde_json::from_str("\"TikTok\"").unwrap();
        assert_eq!(back, Platform::TikTok);
    }
}
