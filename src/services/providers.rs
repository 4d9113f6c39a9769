// src/services/providers.rs

//! Third-party parsing providers.
//!
//! Each provider wraps its payload in its own success envelope and uses its
//! own field names. The envelope check and the field tables live here; the
//! request/response plumbing is shared.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::douyin::normalize_item;
use super::{ResolveContext, Strategy, StrategyOutcome};
use crate::error::{AppError, Result};
use crate::models::{ContentItem, Platform, ProviderConfig, ProviderKind};
use crate::utils::http::{HttpClient, HttpRequest, MOBILE_SAFARI_UA};
use crate::utils::json::{DurationUnit, FieldMap, FieldPath, get_str};

const AUTHOR_FLAT: &[FieldPath] = &[
    &["author", "nickname"],
    &["author"],
    &["nickname"],
    &["author_name"],
];

static TIKWM_FIELDS: FieldMap = FieldMap {
    title: &[&["title"], &["desc"]],
    cover: &[&["cover"], &["origin_cover"]],
    video: &[
        &["hdplay"],
        &["play"],
        &["wmplay"],
        &["video", "play_addr", "url_list", "0"],
    ],
    images: &[&["images"]],
    author: &[
        &["author", "nickname"],
        &["author", "unique_id"],
        &["author", "id"],
    ],
    duration: &[&["duration"]],
    duration_unit: DurationUnit::Guess,
    likes: &[&["digg_count"]],
    comments: &[&["comment_count"]],
    music: &[&["music"], &["music_info", "play"]],
};

static PEARKTRUE_FIELDS: FieldMap = FieldMap {
    title: &[&["title"], &["desc"]],
    cover: &[&["cover"], &["origin_cover"]],
    video: &[&["url"], &["video_url"], &["nwm_video_url"]],
    images: &[&["images"]],
    author: AUTHOR_FLAT,
    duration: &[&["duration"]],
    duration_unit: DurationUnit::Guess,
    likes: &[&["digg_count"]],
    comments: &[&["comment_count"]],
    music: &[&["music_url"], &["music"]],
};

static VVHAN_FIELDS: FieldMap = FieldMap {
    title: &[&["title"], &["desc"]],
    cover: &[&["cover"]],
    video: &[&["url"], &["video_url"]],
    images: &[&["images"]],
    author: AUTHOR_FLAT,
    duration: &[&["duration"]],
    duration_unit: DurationUnit::Guess,
    likes: &[&["digg_count"], &["like"]],
    comments: &[&["comment_count"], &["comment"]],
    music: &[&["music_url"], &["music", "url"]],
};

static LOLIMI_FIELDS: FieldMap = FieldMap {
    title: &[&["title"], &["desc"]],
    cover: &[&["cover"]],
    video: &[&["url"], &["video"], &["video_url"]],
    images: &[&["images"]],
    author: AUTHOR_FLAT,
    duration: &[&["duration"]],
    duration_unit: DurationUnit::Guess,
    likes: &[&["digg_count"], &["like"]],
    comments: &[&["comment_count"], &["comment"]],
    music: &[&["music_url"], &["music", "url"]],
};

/// Adapter for one third-party provider.
pub struct ProviderStrategy {
    kind: ProviderKind,
    endpoint: String,
    client: Arc<dyn HttpClient>,
}

impl ProviderStrategy {
    pub fn new(
        kind: ProviderKind,
        endpoint: impl Into<String>,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn from_config(config: &ProviderConfig, client: Arc<dyn HttpClient>) -> Self {
        Self::new(config.kind, config.endpoint(), client)
    }

    fn build_request(&self, url: &str) -> Result<HttpRequest> {
        let mut params = vec![("url", url)];
        match self.kind {
            ProviderKind::Tikwm => params.push(("hd", "1")),
            ProviderKind::DouyinWtf => params.push(("minimal", "false")),
            ProviderKind::Pearktrue | ProviderKind::Vvhan | ProviderKind::Lolimi => {}
        }
        Ok(HttpRequest::get_with_params(&self.endpoint, &params)?
            .json()
            .header("User-Agent", MOBILE_SAFARI_UA))
    }

    /// Check the provider's own success signal and hand back its `data` object.
    fn unwrap_envelope<'a>(&self, body: &'a Value) -> Result<&'a Value> {
        let ok = match self.kind {
            ProviderKind::Tikwm => numeric_code(body) == Some(0),
            ProviderKind::Pearktrue => numeric_code(body) == Some(200),
            ProviderKind::Lolimi => numeric_code(body) == Some(1),
            ProviderKind::Vvhan => body.get("success").and_then(Value::as_bool) == Some(true),
            ProviderKind::DouyinWtf => {
                body.get("status").and_then(Value::as_str) == Some("success")
            }
        };

        if !ok {
            let message = get_str(body, &["msg"])
                .or_else(|| get_str(body, &["message"]))
                .unwrap_or_else(|| "envelope reports failure".to_string());
            return Err(AppError::envelope(self.kind.name(), message));
        }

        body.get("data")
            .filter(|data| data.is_object())
            .ok_or_else(|| AppError::envelope(self.kind.name(), "response has no data object"))
    }

    fn normalize(&self, data: &Value, platform: Platform) -> ContentItem {
        let fields = match self.kind {
            // Raw Douyin/TikTok aweme payload.
            ProviderKind::DouyinWtf => return normalize_item(data, platform),
            ProviderKind::Tikwm => &TIKWM_FIELDS,
            ProviderKind::Pearktrue => &PEARKTRUE_FIELDS,
            ProviderKind::Vvhan => &VVHAN_FIELDS,
            ProviderKind::Lolimi => &LOLIMI_FIELDS,
        };
        ContentItem::from_fields(fields.extract(data), platform)
    }
}

/// `code` as an integer, whether sent as a number or a numeric string.
fn numeric_code(body: &Value) -> Option<i64> {
    match body.get("code")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Strategy for ProviderStrategy {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn applies_to(&self, platform: Platform) -> bool {
        match self.kind {
            ProviderKind::DouyinWtf => matches!(platform, Platform::Douyin | Platform::TikTok),
            _ => platform.is_supported(),
        }
    }

    async fn attempt(&self, ctx: &ResolveContext<'_>) -> Result<StrategyOutcome> {
        let request = self.build_request(ctx.url)?;
        let body = self.client.get(request).await?.ensure_success()?.json()?;

        let data = match self.unwrap_envelope(&body) {
            Ok(data) => data,
            Err(e) => return Ok(StrategyOutcome::miss(e.to_string())),
        };

        Ok(StrategyOutcome::from_item(
            self.normalize(data, ctx.platform),
            self.name(),
        ))
    }
}
