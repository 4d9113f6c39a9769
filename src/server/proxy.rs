// src/server/proxy.rs

//! Media proxy and download endpoint.
//!
//! Media CDNs reject hotlinked requests, so the proxy re-fetches the asset
//! with a Referer/Origin taken from the asset's own host and streams the
//! bytes back, forwarding `Range` for seeking.

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CACHE_CONTROL, CONTENT_DISPOSITION,
    CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ORIGIN, RANGE, REFERER,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use serde::Deserialize;

use super::{AppState, MSG_MISSING_URL};
use crate::models::ApiResponse;
use crate::utils::url::{build_origin, build_referer, content_disposition, sanitize_filename};

const MSG_INVALID_URL: &str = "无效的媒体链接";
const MSG_UPSTREAM_FAILED: &str = "获取媒体失败,请稍后重试";
const DEFAULT_FILENAME: &str = "download";

/// Upstream headers copied onto the proxied response.
const MIRRORED_HEADERS: [axum::http::HeaderName; 4] =
    [CONTENT_TYPE, CONTENT_LENGTH, CONTENT_RANGE, ACCEPT_RANGES];

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
    /// Suggested download name; triggers `Content-Disposition: attachment`
    pub filename: Option<String>,
}

/// `GET /proxy?url=...[&filename=...]`
pub async fn proxy_handler(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
) -> Response {
    forward(&state, params, &headers, false).await
}

/// `GET /download?url=...[&filename=...]`, always served as an attachment.
pub async fn download_handler(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
) -> Response {
    forward(&state, params, &headers, true).await
}

/// CORS preflight for the media routes.
pub async fn preflight_handler() -> Response {
    (StatusCode::NO_CONTENT, cors_headers()).into_response()
}

async fn forward(
    state: &AppState,
    params: ProxyParams,
    inbound: &HeaderMap,
    as_attachment: bool,
) -> Response {
    let Some(target) = params.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, MSG_MISSING_URL);
    };
    let Some(media_url) = parse_media_url(target) else {
        return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_URL);
    };

    let mut request = state.media.get(media_url.as_str());
    if let Some(referer) = build_referer(media_url.as_str()) {
        request = request.header(REFERER, referer);
    }
    if let Some(origin) = build_origin(media_url.as_str()) {
        request = request.header(ORIGIN, origin);
    }
    if let Some(range) = inbound.get(RANGE) {
        request = request.header(RANGE, range.clone());
    }

    let upstream = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Proxy fetch of {media_url} failed: {e}");
            return error_response(StatusCode::BAD_GATEWAY, MSG_UPSTREAM_FAILED);
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        log::warn!("Proxy upstream {media_url} returned {status}");
        return error_response(StatusCode::BAD_GATEWAY, MSG_UPSTREAM_FAILED);
    }

    let mut headers = cors_headers();
    for name in MIRRORED_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    if as_attachment || params.filename.is_some() {
        let filename = download_filename(params.filename.as_deref(), &media_url);
        match HeaderValue::from_str(&content_disposition(&filename)) {
            Ok(value) => {
                headers.insert(CONTENT_DISPOSITION, value);
            }
            Err(e) => log::warn!("Skipping Content-Disposition for {filename}: {e}"),
        }
    }

    let url_for_log = media_url.to_string();
    let body = upstream
        .bytes_stream()
        .inspect_err(move |e| log::warn!("Proxy stream from {url_for_log} aborted: {e}"));

    (status, headers, Body::from_stream(body)).into_response()
}

/// Absolute http(s) URL with a host, or `None`.
fn parse_media_url(raw: &str) -> Option<url::Url> {
    let parsed = url::Url::parse(raw).ok()?;
    (matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()).then_some(parsed)
}

/// Sanitized caller-supplied name, else the URL's last path segment.
fn download_filename(requested: Option<&str>, media_url: &url::Url) -> String {
    let from_url = || {
        media_url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string)
    };

    requested
        .map(str::to_string)
        .or_else(from_url)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, HEAD, OPTIONS"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Range"));
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Length, Content-Range, Accept-Ranges"),
    );
    headers
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, cors_headers(), Json(ApiResponse::<()>::err(message))).into_response()
}
