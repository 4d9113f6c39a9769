// src/services/watermark.rs

//! Douyin CDN watermark rewrite.
//!
//! The CDN serves the same asset without the overlay when the `playwm`
//! path segment is swapped for `play` and the watermark query flags are
//! dropped. This convention is reverse-engineered; keep every detail of it
//! in this module.

const WATERMARK_PARAMS: [&str; 3] = ["logo_name", "watermark", "wm"];

/// Rewrite a play address to its watermark-free form.
///
/// Idempotent: URLs already using `/play/` without watermark flags come back unchanged.
pub fn remove_watermark(raw_url: &str) -> String {
    let sanitized = raw_url.trim().replace("\\u002F", "/");

    match url::Url::parse(&sanitized) {
        Ok(parsed) => rewrite_parsed(parsed).unwrap_or(sanitized),
        Err(_) => rewrite_plain(&sanitized),
    }
}

/// Returns `None` when nothing needed changing.
fn rewrite_parsed(mut parsed: url::Url) -> Option<String> {
    let mut changed = false;

    let segments: Option<Vec<String>> = parsed
        .path_segments()
        .map(|segs| segs.map(str::to_string).collect());
    if let Some(segments) = segments {
        if segments.iter().any(|s| s == "playwm") {
            let path = segments
                .iter()
                .map(|s| if s == "playwm" { "play" } else { s.as_str() })
                .collect::<Vec<_>>()
                .join("/");
            parsed.set_path(&format!("/{path}"));
            changed = true;
        }
    }

    if let Some(query) = parsed.query() {
        if query.split('&').any(is_watermark_flag) {
            let kept = kept_query_pairs(query).join("&");
            parsed.set_query((!kept.is_empty()).then_some(kept.as_str()));
            changed = true;
        }
    }

    changed.then(|| parsed.to_string())
}

fn is_watermark_flag(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or_default();
    WATERMARK_PARAMS.contains(&key)
}

/// Raw `key=value` pairs minus watermark flags, bytes untouched.
fn kept_query_pairs(query: &str) -> Vec<&str> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_watermark_flag(pair))
        .collect()
}

fn rewrite_plain(raw: &str) -> String {
    let (base, query) = match raw.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (raw, None),
    };

    let base = base.replace("/playwm/", "/play/");
    let base = match base.strip_suffix("/playwm") {
        Some(prefix) => format!("{prefix}/play"),
        None => base,
    };

    let kept = query.map(kept_query_pairs).unwrap_or_default();

    if kept.is_empty() {
        base
    } else {
        format!("{base}?{}", kept.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_path_and_drops_flags() {
        assert_eq!(
            remove_watermark("https://aweme.snssdk.com/aweme/v1/playwm/abc?logo_name=x&wm=1"),
            "https://aweme.snssdk.com/aweme/v1/play/abc"
        );
    }

    #[test]
    fn test_keeps_unrelated_params() {
        assert_eq!(
            remove_watermark(
                "https://aweme.snssdk.com/aweme/v1/playwm/?video_id=v0200&ratio=720p&watermark=1"
            ),
            "https://aweme.snssdk.com/aweme/v1/play/?video_id=v0200&ratio=720p"
        );
    }

    #[test]
    fn test_kept_params_are_not_reencoded() {
        assert_eq!(
            remove_watermark(
                "https://aweme.snssdk.com/aweme/v1/playwm/?video_id=a~b&sig=x%2Fy,z&wm=1"
            ),
            "https://aweme.snssdk.com/aweme/v1/play/?video_id=a~b&sig=x%2Fy,z"
        );
    }

    #[test]
    fn test_trailing_segment() {
        assert_eq!(
            remove_watermark("https://aweme.snssdk.com/aweme/v1/playwm?video_id=1"),
            "https://aweme.snssdk.com/aweme/v1/play?video_id=1"
        );
    }

    #[test]
    fn test_idempotent() {
        let clean = "https://aweme.snssdk.com/aweme/v1/play/?video_id=v0200&ratio=720p";
        assert_eq!(remove_watermark(clean), clean);

        let once = remove_watermark("https://x.com/playwm/abc?logo_name=x&wm=1");
        assert_eq!(remove_watermark(&once), once);
    }

    #[test]
    fn test_does_not_touch_lookalike_segments() {
        let url = "https://x.com/playwmfoo/abc";
        assert_eq!(remove_watermark(url), url);
    }

    #[test]
    fn test_unescapes_embedded_slashes() {
        assert_eq!(
            remove_watermark(r"https:\u002F\u002Fx.com\u002Fplaywm\u002Fabc"),
            "https://x.com/play/abc"
        );
    }

    #[test]
    fn test_plain_fallback() {
        assert_eq!(
            remove_watermark("//cdn.example.com/playwm/abc?logo_name=x&wm=1"),
            "//cdn.example.com/play/abc"
        );
        assert_eq!(
            remove_watermark("//cdn.example.com/playwm/abc?a=1&wm=1&b=2"),
            "//cdn.example.com/play/abc?a=1&b=2"
        );
    }
}
