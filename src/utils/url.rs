// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};

/// An absolute http(s) URL made only of characters legal in a URL.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+").expect("static URL regex")
});

const MAX_FILENAME_GRAPHEMES: usize = 100;

/// Pull the first well-formed http(s) URL out of free-form share text.
///
/// A bare URL is returned unchanged.
///
/// # Examples
/// ```
/// use share_resolver::utils::url::extract_url;
///
/// assert_eq!(
///     extract_url("看看这个 https://v.douyin.com/abc123/ 超搞笑").unwrap(),
///     "https://v.douyin.com/abc123/"
/// );
/// ```
pub fn extract_url(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if is_bare_url(trimmed) {
        return Ok(trimmed.to_string());
    }

    URL_PATTERN
        .find_iter(trimmed)
        .map(|m| m.as_str().trim_end_matches([',', '.', ';', '!', '\'', ')']))
        .find(|candidate| is_absolute_http(candidate))
        .map(str::to_string)
        .ok_or(AppError::NoUrlFound)
}

fn is_bare_url(text: &str) -> bool {
    !text.chars().any(char::is_whitespace) && is_absolute_http(text)
}

fn is_absolute_http(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// `scheme://host/` of a media URL, used as its own Referer.
pub fn build_referer(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}

/// Origin header value for a media URL (referer without the trailing slash).
pub fn build_origin(url: &str) -> Option<String> {
    build_referer(url).map(|r| r.trim_end_matches('/').to_string())
}

/// Make a user-supplied title safe to use as a download filename.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .collect();
    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    joined.graphemes(true).take(MAX_FILENAME_GRAPHEMES).collect()
}

/// `Content-Disposition` value for an attachment, with an RFC 5987 UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(filename.as_bytes()).collect();
    format!("attachment; filename*=UTF-8''{}", encoded.replace('+', "%20"))
}
