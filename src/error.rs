// src/error.rs

//! Unified error handling for the resolver.

use std::fmt;

use thiserror::Error;

use crate::services::Attempt;

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Shown to callers whenever every strategy came back empty-handed.
pub const MSG_EXHAUSTED: &str = "解析失败,请检查链接是否正确或稍后重试";

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input text contained no usable http(s) link
    #[error("no URL found in input")]
    NoUrlFound,

    /// Link belongs to a platform with no resolver support
    #[error("unsupported platform: {url}")]
    UnsupportedPlatform { url: String },

    /// Every applicable strategy missed or failed
    #[error("all {} strategies failed", attempts.len())]
    Exhausted { attempts: Vec<Attempt> },

    /// Upstream answered with a non-success status
    #[error("upstream {url} returned HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// Provider envelope signalled failure
    #[error("{provider}: {message}")]
    Envelope { provider: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Page or payload could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a parse error.
    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// Create a provider envelope error.
    pub fn envelope(provider: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Envelope {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Message safe to hand back to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoUrlFound => "未找到有效链接,请粘贴完整的分享链接",
            Self::UnsupportedPlatform { .. } => "不支持的平台,目前仅支持抖音、快手、小红书、TikTok",
            Self::Exhausted { .. } => MSG_EXHAUSTED,
            _ => "解析失败,请稍后重试",
        }
    }

    /// Whether the failure was caused by the caller's input rather than upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoUrlFound | Self::UnsupportedPlatform { .. })
    }
}
