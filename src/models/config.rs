//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Listen address for the HTTP surface
    #[serde(default)]
    pub server: ServerConfig,

    /// Strategy chain settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(AppError::validation(
                "http.connect_timeout_secs must be > 0",
            ));
        }
        if self.server.port == 0 {
            return Err(AppError::validation("server.port must be > 0"));
        }
        if self.resolver.strategy_timeout_secs == 0 {
            return Err(AppError::validation(
                "resolver.strategy_timeout_secs must be > 0",
            ));
        }
        for provider in &self.resolver.providers {
            if let Some(endpoint) = &provider.endpoint {
                let parsed = url::Url::parse(endpoint).map_err(|e| {
                    AppError::validation(format!(
                        "resolver.providers[{}].endpoint is not a URL: {e}",
                        provider.kind.name()
                    ))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::validation(format!(
                        "resolver.providers[{}].endpoint must be http(s)",
                        provider.kind.name()
                    )));
                }
            }
        }
        let any_enabled = self.resolver.share_page
            || self.resolver.item_api
            || self.resolver.providers.iter().any(|p| p.enabled);
        if !any_enabled {
            return Err(AppError::validation("No resolution strategy enabled"));
        }
        Ok(())
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SHARE_RESOLVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SHARE_RESOLVER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(secs) = lookup("SHARE_RESOLVER_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.http.timeout_secs = secs;
        }
    }
}

/// Outbound HTTP settings shared by every strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for outbound requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds (also bounds the media proxy)
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirects followed per request
    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: usize,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            connect_timeout_secs: defaults::connect_timeout(),
            max_redirects: defaults::max_redirects(),
        }
    }
}

/// HTTP surface listen settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

/// Which strategies run, and in which order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Scrape the Douyin share page first
    #[serde(default = "defaults::enabled")]
    pub share_page: bool,

    /// Query the Douyin item-info API after the share page
    #[serde(default = "defaults::enabled")]
    pub item_api: bool,

    /// Upper bound for a single strategy attempt
    #[serde(default = "defaults::strategy_timeout")]
    pub strategy_timeout_secs: u64,

    /// Third-party providers, attempted in listed order
    #[serde(default = "defaults::providers")]
    pub providers: Vec<ProviderConfig>,
}

impl ResolverConfig {
    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_secs(self.strategy_timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            share_page: true,
            item_api: true,
            strategy_timeout_secs: defaults::strategy_timeout(),
            providers: defaults::providers(),
        }
    }
}

/// Known third-party parsing providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Tikwm,
    Pearktrue,
    Vvhan,
    Lolimi,
    DouyinWtf,
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Tikwm => "tikwm",
            Self::Pearktrue => "pearktrue",
            Self::Vvhan => "vvhan",
            Self::Lolimi => "lolimi",
            Self::DouyinWtf => "douyin_wtf",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::Tikwm => "https://www.tikwm.com/api/",
            Self::Pearktrue => "https://api.pearktrue.cn/api/video/douyin/",
            Self::Vvhan => "https://api.vvhan.com/api/video",
            Self::Lolimi => "https://api.lolimi.cn/API/dy/",
            Self::DouyinWtf => "https://douyin.wtf/api/hybrid/video_data",
        }
    }
}

/// A provider entry in the strategy chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Overrides the provider's public endpoint (e.g. a self-hosted mirror)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            endpoint: None,
            enabled: true,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }
}

mod defaults {
    use super::{ProviderConfig, ProviderKind};

    pub fn user_agent() -> String {
        "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Mobile Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        8
    }
    pub fn connect_timeout() -> u64 {
        5
    }
    pub fn max_redirects() -> usize {
        10
    }

    pub fn host() -> String {
        "0.0.0.0".into()
    }
    pub fn port() -> u16 {
        3000
    }

    pub fn enabled() -> bool {
        true
    }
    pub fn strategy_timeout() -> u64 {
        15
    }
    pub fn providers() -> Vec<ProviderConfig> {
        [
            ProviderKind::Tikwm,
            ProviderKind::Pearktrue,
            ProviderKind::Vvhan,
            ProviderKind::Lolimi,
            ProviderKind::DouyinWtf,
        ]
        .into_iter()
        .map(ProviderConfig::new)
        .collect()
    }
}
