// src/services/item_api.rs

//! Douyin item-info API strategy.

use std::sync::Arc;

use async_trait::async_trait;

use super::douyin::{SHARE_REFERER, fetch_page, normalize_item};
use super::reference::{find_reference, resolve_reference};
use super::{ResolveContext, Strategy, StrategyOutcome};
use crate::error::Result;
use crate::models::{ContentReference, Platform};
use crate::utils::http::{HttpClient, HttpRequest, MOBILE_SAFARI_UA};
use crate::utils::json::get_path;

pub const ITEM_INFO_ENDPOINT: &str = "https://www.iesdouyin.com/web/api/v2/aweme/iteminfo/";

/// Looks the item up by id on the public item-info endpoint.
pub struct ItemApiStrategy {
    client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl ItemApiStrategy {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self::with_endpoint(client, ITEM_INFO_ENDPOINT)
    }

    pub fn with_endpoint(client: Arc<dyn HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Read the id off the URL itself, or follow the short link to find it.
    async fn reference_for(&self, url: &str) -> Result<Option<ContentReference>> {
        if let Some(reference) = find_reference(url) {
            return Ok(Some(reference));
        }
        let page = fetch_page(self.client.as_ref(), url).await?;
        Ok(resolve_reference(&page.final_url, Some(&page.body)))
    }
}

#[async_trait]
impl Strategy for ItemApiStrategy {
    fn name(&self) -> &str {
        "douyin_item_api"
    }

    fn applies_to(&self, platform: Platform) -> bool {
        platform == Platform::Douyin
    }

    async fn attempt(&self, ctx: &ResolveContext<'_>) -> Result<StrategyOutcome> {
        let Some(reference) = self.reference_for(ctx.url).await? else {
            return Ok(StrategyOutcome::miss("could not determine item id"));
        };

        let params = [("item_ids", reference.id.as_str())];
        let request = HttpRequest::get_with_params(&self.endpoint, &params)?
            .json()
            .header("User-Agent", MOBILE_SAFARI_UA)
            .header("Referer", SHARE_REFERER);
        let body = self.client.get(request).await?.ensure_success()?.json()?;

        match get_path(&body, &["item_list", "0"]).filter(|item| item.is_object()) {
            Some(item) => Ok(StrategyOutcome::from_item(
                normalize_item(item, ctx.platform),
                self.name(),
            )),
            None => Ok(StrategyOutcome::miss(format!(
                "item list empty for {}",
                reference.id
            ))),
        }
    }
}
