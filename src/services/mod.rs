//! Service layer for the resolver.
//!
//! Every way of turning a share link into a [`ContentItem`] implements
//! [`Strategy`]:
//! - Douyin share-page scrape (`SharePageStrategy`)
//! - Douyin item-info API (`ItemApiStrategy`)
//! - Third-party parsing providers (`ProviderStrategy`)

mod douyin;
mod item_api;
mod providers;
pub mod reference;
mod share_page;
pub mod watermark;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ContentItem, Platform};

pub use item_api::ItemApiStrategy;
pub use providers::ProviderStrategy;
pub use share_page::SharePageStrategy;

#[cfg(test)]
pub(crate) use douyin::fixtures as douyin_fixtures;

/// The canonical URL being resolved and its detected platform.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub url: &'a str,
    pub platform: Platform,
}

/// Non-error result of one strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Resolved(ContentItem),
    /// The strategy had nothing usable; not a failure
    Miss(String),
}

impl StrategyOutcome {
    pub fn miss(reason: impl Into<String>) -> Self {
        Self::Miss(reason.into())
    }

    /// Resolved if the item passes validation, a miss otherwise.
    pub fn from_item(item: ContentItem, source: &str) -> Self {
        match item.validated() {
            Some(item) => Self::Resolved(item),
            None => Self::Miss(format!("{source} returned incomplete content")),
        }
    }
}

/// One way of resolving a link. Errors are contained by the orchestrator.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this strategy should run for `platform` at all.
    fn applies_to(&self, platform: Platform) -> bool {
        platform.is_supported()
    }

    async fn attempt(&self, ctx: &ResolveContext<'_>) -> Result<StrategyOutcome>;
}

/// Why a strategy did not produce an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptDetail {
    Miss(String),
    Error(String),
    TimedOut,
}

impl fmt::Display for AttemptDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptDetail::Miss(reason) => write!(f, "miss: {reason}"),
            AttemptDetail::Error(reason) => write!(f, "error: {reason}"),
            AttemptDetail::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Record of a strategy that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: String,
    pub detail: AttemptDetail,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.detail)
    }
}
