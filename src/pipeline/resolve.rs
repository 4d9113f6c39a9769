// src/pipeline/resolve.rs

//! Resolution pipeline.
//!
//! Runs the configured strategies in priority order until one yields a
//! valid item. Strategy failures never abort the run; they are recorded
//! and the next strategy is tried.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::{AppError, Result};
use crate::models::{Config, ContentItem, Platform};
use crate::services::{
    Attempt, AttemptDetail, ItemApiStrategy, ProviderStrategy, ResolveContext, SharePageStrategy,
    Strategy, StrategyOutcome,
};
use crate::utils::http::HttpClient;
use crate::utils::url::extract_url;

const DEFAULT_STRATEGY_TIMEOUT: Duration = Duration::from_secs(15);

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub item: ContentItem,
    /// Name of the strategy that produced the item
    pub strategy: String,
    /// Strategies tried before it
    pub attempts: Vec<Attempt>,
}

/// Ordered strategy chain.
pub struct Resolver {
    strategies: Vec<Box<dyn Strategy>>,
    strategy_timeout: Duration,
}

impl Resolver {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            strategies,
            strategy_timeout: DEFAULT_STRATEGY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, strategy_timeout: Duration) -> Self {
        self.strategy_timeout = strategy_timeout;
        self
    }

    /// Build the standard chain: share page, item API, then the enabled providers in file order.
    pub fn from_config(config: &Config, client: Arc<dyn HttpClient>) -> Self {
        let resolver = &config.resolver;
        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();

        if resolver.share_page {
            strategies.push(Box::new(SharePageStrategy::new(client.clone())));
        }
        if resolver.item_api {
            strategies.push(Box::new(ItemApiStrategy::new(client.clone())));
        }
        strategies.extend(
            resolver
                .providers
                .iter()
                .filter(|provider| provider.enabled)
                .map(|provider| {
                    Box::new(ProviderStrategy::from_config(provider, client.clone()))
                        as Box<dyn Strategy>
                }),
        );

        Self::new(strategies).with_timeout(resolver.strategy_timeout())
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve free-form share text into a content item.
    ///
    /// Fails before any network call when the text has no link or the link's
    /// platform is unsupported.
    pub async fn resolve(&self, raw: &str) -> Result<Resolution> {
        let url = extract_url(raw)?;
        let platform = Platform::detect(&url);
        if !platform.is_supported() {
            log::info!("Unsupported platform for {url}");
            return Err(AppError::UnsupportedPlatform { url });
        }

        log::info!("Resolving {url} ({platform})");
        let ctx = ResolveContext {
            url: &url,
            platform,
        };

        let mut attempts = Vec::new();
        for strategy in self.strategies.iter().filter(|s| s.applies_to(platform)) {
            let name = strategy.name();
            let detail = match timeout(self.strategy_timeout, strategy.attempt(&ctx)).await {
                Ok(Ok(StrategyOutcome::Resolved(item))) => match item.validated() {
                    Some(item) => {
                        log::info!("Resolved {url} via {name}");
                        return Ok(Resolution {
                            item,
                            strategy: name.to_string(),
                            attempts,
                        });
                    }
                    None => AttemptDetail::Miss("invalid content item".to_string()),
                },
                Ok(Ok(StrategyOutcome::Miss(reason))) => AttemptDetail::Miss(reason),
                Ok(Err(e)) => AttemptDetail::Error(e.to_string()),
                Err(_) => AttemptDetail::TimedOut,
            };

            log::debug!("{name} did not resolve {url}: {detail}");
            attempts.push(Attempt {
                strategy: name.to_string(),
                detail,
            });
        }

        log::warn!(
            "All strategies failed for {url}: [{}]",
            attempts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Err(AppError::Exhausted { attempts })
    }
}
