// src/services/share_page.rs

//! Douyin share-page scrape strategy.

use std::sync::Arc;

use async_trait::async_trait;

use super::douyin::{fetch_page, item_from_html};
use super::reference::resolve_reference;
use super::{ResolveContext, Strategy, StrategyOutcome};
use crate::error::Result;
use crate::models::{ContentReference, Platform, ReferenceKind};
use crate::utils::http::HttpClient;

const SHARE_BASE: &str = "https://www.iesdouyin.com/share";

/// Scrapes the embedded state of the share page, falling back to canonical
/// share URLs built from the content id.
pub struct SharePageStrategy {
    client: Arc<dyn HttpClient>,
}

impl SharePageStrategy {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy for SharePageStrategy {
    fn name(&self) -> &str {
        "douyin_share_page"
    }

    fn applies_to(&self, platform: Platform) -> bool {
        platform == Platform::Douyin
    }

    async fn attempt(&self, ctx: &ResolveContext<'_>) -> Result<StrategyOutcome> {
        let page = fetch_page(self.client.as_ref(), ctx.url).await?;
        if let Some(item) = item_from_html(&page.body, ctx.platform) {
            return Ok(StrategyOutcome::Resolved(item));
        }

        let Some(reference) = resolve_reference(&page.final_url, Some(&page.body)) else {
            return Ok(StrategyOutcome::miss("no content reference on share page"));
        };
        log::debug!(
            "share page {} had no state, trying {} {}",
            page.final_url,
            reference.kind,
            reference.id
        );

        let candidates = candidate_urls(&reference);
        let mut failures = Vec::new();
        for candidate in &candidates {
            match fetch_page(self.client.as_ref(), candidate).await {
                Ok(response) => match item_from_html(&response.body, ctx.platform) {
                    Some(item) => return Ok(StrategyOutcome::Resolved(item)),
                    None => failures.push(format!("{candidate}: no item")),
                },
                Err(e) => failures.push(format!("{candidate}: {e}")),
            }
        }

        Ok(StrategyOutcome::miss(format!(
            "{} candidate pages failed ({})",
            candidates.len(),
            failures.join("; ")
        )))
    }
}

/// Share URLs to try for a reference: its own kind first, then every kind.
pub fn candidate_urls(reference: &ContentReference) -> Vec<String> {
    let mut urls: Vec<String> = Vec::with_capacity(ReferenceKind::ALL.len() + 1);
    let kinds = std::iter::once(reference.kind).chain(ReferenceKind::ALL);
    for kind in kinds {
        let url = format!("{SHARE_BASE}/{kind}/{}/", reference.id);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::MediaKind;
    use crate::services::douyin::fixtures::{GALLERY_ITEM, VIDEO_ITEM, router_page};
    use crate::utils::http::mock::MockHttpClient;

    const SHORT_LINK: &str = "https://v.douyin.com/abc123/";

    fn ctx() -> ResolveContext<'static> {
        ResolveContext {
            url: SHORT_LINK,
            platform: Platform::Douyin,
        }
    }

    #[test]
    fn test_candidate_urls_dedup() {
        let reference = ContentReference {
            id: "42".into(),
            kind: ReferenceKind::Note,
        };
        assert_eq!(
            candidate_urls(&reference),
            vec![
                "https://www.iesdouyin.com/share/note/42/",
                "https://www.iesdouyin.com/share/video/42/",
                "https://www.iesdouyin.com/share/slides/42/",
            ]
        );
    }

    #[test]
    fn test_only_douyin() {
        let strategy = SharePageStrategy::new(Arc::new(MockHttpClient::new()));
        assert!(strategy.applies_to(Platform::Douyin));
        assert!(!strategy.applies_to(Platform::TikTok));
        assert!(!strategy.applies_to(Platform::Unknown));
    }

    #[tokio::test]
    async fn test_resolves_from_source_page() {
        let mock = Arc::new(
            MockHttpClient::new()
                .redirect(SHORT_LINK, "https://www.iesdouyin.com/share/video/7301234567890/")
                .on(SHORT_LINK, router_page(VIDEO_ITEM)),
        );
        let strategy = SharePageStrategy::new(mock.clone());

        let outcome = strategy.attempt(&ctx()).await.unwrap();
        let StrategyOutcome::Resolved(item) = outcome else {
            panic!("expected item");
        };
        assert_eq!(item.kind, MediaKind::Video);
        assert_eq!(mock.requested_urls(), vec![SHORT_LINK]);

        let request = &mock.requests()[0];
        assert!(request.headers.iter().any(|(k, _)| *k == "Referer"));
    }

    #[tokio::test]
    async fn test_falls_back_to_candidates() {
        let mock = Arc::new(
            MockHttpClient::new()
                .redirect(SHORT_LINK, "https://www.douyin.com/discover?modal_id=7300000000001")
                .on(SHORT_LINK, "<html><body>loading</body></html>")
                .on_status("https://www.iesdouyin.com/share/video/", 500, "")
                .on("https://www.iesdouyin.com/share/note/", router_page(GALLERY_ITEM)),
        );
        let strategy = SharePageStrategy::new(mock.clone());

        let outcome = strategy.attempt(&ctx()).await.unwrap();
        let StrategyOutcome::Resolved(item) = outcome else {
            panic!("expected item");
        };
        assert_eq!(item.kind, MediaKind::Image);
        assert_eq!(
            mock.requested_urls(),
            vec![
                SHORT_LINK,
                "https://www.iesdouyin.com/share/video/7300000000001/",
                "https://www.iesdouyin.com/share/note/7300000000001/",
            ]
        );
    }

    #[tokio::test]
    async fn test_no_reference_is_miss() {
        let mock = Arc::new(MockHttpClient::new().on(SHORT_LINK, "<html>nothing</html>"));
        let outcome = SharePageStrategy::new(mock).attempt(&ctx()).await.unwrap();
        assert!(matches!(outcome, StrategyOutcome::Miss(_)));
    }

    #[tokio::test]
    async fn test_exhausted_candidates_is_miss() {
        let mock = Arc::new(
            MockHttpClient::new()
                .redirect(SHORT_LINK, "https://www.iesdouyin.com/share/video/1/")
                .on(SHORT_LINK, "<html/>")
                .on("https://www.iesdouyin.com/share/", "<html/>"),
        );
        let mock_ref = mock.clone();
        let outcome = SharePageStrategy::new(mock).attempt(&ctx()).await.unwrap();
        let StrategyOutcome::Miss(reason) = outcome else {
            panic!("expected miss");
        };
        assert!(reason.starts_with("3 candidate pages failed"));
        assert_eq!(mock_ref.requested_urls().len(), 4);
    }

    #[tokio::test]
    async fn test_source_fetch_error_propagates() {
        let mock = Arc::new(MockHttpClient::new().on_status(SHORT_LINK, 403, ""));
        let result = SharePageStrategy::new(mock).attempt(&ctx()).await;
        assert!(matches!(
            result,
            Err(AppError::UpstreamStatus { status: 403, .. })
        ));
    }
}
