// src/services/reference.rs

//! Content reference extraction.
//!
//! Recovers `(id, kind)` from a redirected share URL or, failing that,
//! from the page markup itself.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ContentReference, ReferenceKind};

/// Patterns tried in order; the first capture wins.
static PATTERNS: LazyLock<Vec<(Regex, ReferenceKind)>> = LazyLock::new(|| {
    [
        (r"/video/(\d+)", ReferenceKind::Video),
        (r"/note/(\d+)", ReferenceKind::Note),
        (r"/slides/(\d+)", ReferenceKind::Slides),
        (r"[?&]modal_id=(\d+)", ReferenceKind::Video),
        (r"[?&]aweme_id=(\d+)", ReferenceKind::Video),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("static reference regex"), kind))
    .collect()
});

/// Find a content reference anywhere in `text`.
pub fn find_reference(text: &str) -> Option<ContentReference> {
    PATTERNS.iter().find_map(|(re, kind)| {
        re.captures(text).and_then(|caps| caps.get(1)).map(|id| ContentReference {
            id: id.as_str().to_string(),
            kind: *kind,
        })
    })
}

/// Derive a reference from the resolved URL, then from the page body if given.
///
/// `None` means no reference could be determined; callers treat that as
/// not-applicable rather than a failure.
pub fn resolve_reference(url: &str, html: Option<&str>) -> Option<ContentReference> {
    find_reference(url).or_else(|| html.and_then(find_reference))
}
