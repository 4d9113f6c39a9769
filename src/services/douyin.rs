// src/services/douyin.rs

//! Douyin share-page plumbing shared by the scrape and item-info strategies.
//!
//! Share pages server-render the app state into a `<script>` as
//! `window._ROUTER_DATA = {...}` (older pages use `_SSR_HYDRATED_DATA`).
//! The container key around the item changes between page templates, so
//! the item is located by shape rather than by a fixed path.

use std::borrow::Cow;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use super::watermark::remove_watermark;
use crate::error::Result;
use crate::models::{ContentItem, Platform};
use crate::utils::http::{
    ACCEPT_HTML, ACCEPT_LANGUAGE_ZH, HttpClient, HttpRequest, HttpResponse, MOBILE_SAFARI_UA,
};
use crate::utils::json::{DurationUnit, FieldMap, get_path};
use crate::utils::truncate_for_log;

pub const SHARE_REFERER: &str = "https://www.douyin.com/";

const STATE_MARKERS: [&str; 2] = ["window._ROUTER_DATA", "window._SSR_HYDRATED_DATA"];

/// Bound on the shape search; real state trees are well under this.
const MAX_SEARCH_DEPTH: usize = 16;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("static script selector"));

/// Field candidates for a Douyin `aweme` item, as found in share pages and the item-info API.
pub static DOUYIN_ITEM_FIELDS: FieldMap = FieldMap {
    title: &[&["desc"], &["title"]],
    cover: &[
        &["video", "cover", "url_list", "0"],
        &["video", "origin_cover", "url_list", "0"],
        &["video", "dynamic_cover", "url_list", "0"],
    ],
    video: &[
        &["video", "bit_rate", "0", "play_addr", "url_list", "0"],
        &["video", "play_addr", "url_list", "0"],
        &["video", "download_addr", "url_list", "0"],
    ],
    images: &[&["images"], &["image_infos"], &["images_list"]],
    author: &[
        &["author", "nickname"],
        &["author", "unique_id"],
        &["author", "short_id"],
    ],
    duration: &[&["video", "duration"], &["duration"]],
    duration_unit: DurationUnit::Millis,
    likes: &[&["statistics", "digg_count"]],
    comments: &[&["statistics", "comment_count"]],
    music: &[
        &["music", "play_url", "url_list", "0"],
        &["music", "play_url", "uri"],
    ],
};

/// Normalize a Douyin item, rewriting the play address to its watermark-free form.
pub fn normalize_item(item: &Value, platform: Platform) -> ContentItem {
    let mut fields = DOUYIN_ITEM_FIELDS.extract(item);
    fields.video_url = fields.video_url.map(|url| remove_watermark(&url));
    ContentItem::from_fields(fields, platform)
}

/// GET a share page the way the mobile app's web view would.
pub async fn fetch_page(client: &dyn HttpClient, url: &str) -> Result<HttpResponse> {
    let request = HttpRequest::get(url)
        .header("User-Agent", MOBILE_SAFARI_UA)
        .header("Accept", ACCEPT_HTML)
        .header("Accept-Language", ACCEPT_LANGUAGE_ZH)
        .header("Referer", SHARE_REFERER);

    client.get(request).await?.ensure_success()
}

/// Parse the embedded app state out of a share page.
///
/// `None` when no script carries a known marker or its payload is not JSON.
pub fn extract_state_json(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);

    document
        .select(&SCRIPT_SELECTOR)
        .map(|script| script.text().collect::<String>())
        .find_map(|text| {
            STATE_MARKERS
                .iter()
                .find_map(|marker| parse_after_marker(&text, marker))
        })
}

fn parse_after_marker(script: &str, marker: &str) -> Option<Value> {
    let rest = &script[script.find(marker)? + marker.len()..];
    let literal = &rest[rest.find('{')?..];
    let literal = undefined_to_null(literal);

    // Only the first value matters; trailing `;` or statements are ignored.
    let mut values = serde_json::Deserializer::from_str(&literal).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            log::debug!(
                "{marker} payload is not valid JSON: {e} ({})",
                truncate_for_log(&literal, 120)
            );
            None
        }
        None => None,
    }
}

/// Rewrite bare `undefined` in value position to `null`, leaving string contents alone.
fn undefined_to_null(literal: &str) -> Cow<'_, str> {
    const TOKEN: &str = "undefined";

    if !literal.contains(TOKEN) {
        return Cow::Borrowed(literal);
    }

    let bytes = literal.as_bytes();
    let mut out = String::with_capacity(literal.len());
    let mut copied = 0;
    let mut in_string = false;
    let mut escaped = false;
    // Last non-whitespace byte seen outside a string.
    let mut prev = 0u8;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
                prev = b;
            }
            i += 1;
            continue;
        }

        if b == b'u' && matches!(prev, b':' | b'[' | b',') && literal[i..].starts_with(TOKEN) {
            let end = i + TOKEN.len();
            let boundary = !bytes
                .get(end)
                .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$'));
            if boundary {
                out.push_str(&literal[copied..i]);
                out.push_str("null");
                copied = end;
                prev = b'l';
                i = end;
                continue;
            }
        }

        if b == b'"' {
            in_string = true;
        }
        if !b.is_ascii_whitespace() {
            prev = b;
        }
        i += 1;
    }

    if copied == 0 {
        return Cow::Borrowed(literal);
    }
    out.push_str(&literal[copied..]);
    Cow::Owned(out)
}

/// Locate the content item inside a parsed state tree.
pub fn find_item(state: &Value) -> Option<&Value> {
    router_item(state).or_else(|| search_item(state, 0))
}

/// The usual `loaderData.<route>.videoInfoRes.item_list[0]` location.
fn router_item(state: &Value) -> Option<&Value> {
    state
        .get("loaderData")?
        .as_object()?
        .values()
        .find_map(|route| get_path(route, &["videoInfoRes", "item_list", "0"]))
        .filter(|item| looks_like_item(item))
}

fn search_item(value: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            if looks_like_item(value) {
                return Some(value);
            }
            map.values().find_map(|child| search_item(child, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|child| search_item(child, depth + 1)),
        _ => None,
    }
}

fn looks_like_item(value: &Value) -> bool {
    let has = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
    (has("desc") || has("aweme_id")) && (has("video") || has("images"))
}

/// Scrape-and-normalize a page body. Returns only items that pass validation.
pub fn item_from_html(html: &str, platform: Platform) -> Option<ContentItem> {
    let state = extract_state_json(html)?;
    let item = find_item(&state)?;
    normalize_item(item, platform).validated()
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A share page in the current `_ROUTER_DATA` layout.
    pub fn router_page(item_json: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html><head><title>抖音</title></head><body>
<div id="root"></div>
<script nonce="x">window._ROUTER_DATA = {{"loaderData":{{"video_(id)/page":{{"videoInfoRes":{{"item_list":[{item_json}]}}}}}}}};</script>
</body></html>"#
        )
    }

    pub const VIDEO_ITEM: &str = r#"{
        "aweme_id": "7301234567890",
        "desc": "周末去海边",
        "video": {
            "play_addr": {"url_list": ["https://aweme.snssdk.com/aweme/v1/playwm/?video_id=v0200&ratio=720p&logo_name=aweme"]},
            "cover": {"url_list": ["https://p3.douyinpic.com/cover.jpeg"]},
            "duration": 15300
        },
        "author": {"nickname": "小明", "unique_id": "xm"},
        "statistics": {"digg_count": 1024, "comment_count": 12},
        "music": {"play_url": {"uri": "https://sf.douyinstatic.com/music.mp3", "url_list": []}}
    }"#;

    pub const GALLERY_ITEM: &str = r#"{
        "aweme_id": "7300000000001",
        "desc": "相册",
        "images": [
            {"url_list": ["https://p3.douyinpic.com/1.webp"]},
            {"url_list": ["https://p3.douyinpic.com/2.webp"]}
        ],
        "video": {"play_addr": {"url_list": ["https://aweme.snssdk.com/aweme/v1/playwm/?video_id=music"]}}
    }"#;
}
