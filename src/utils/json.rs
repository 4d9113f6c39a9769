// src/utils/json.rs

//! Field lookup over loosely structured JSON payloads.
//!
//! Upstream sources disagree on field names, so each logical field is
//! described by an ordered list of candidate paths; the first present,
//! non-empty value wins. Numeric path segments index into arrays, so
//! `["video", "play_addr", "url_list", "0"]` reads the first URL.

use serde_json::Value;

use crate::models::MediaFields;

/// One candidate location, as a sequence of object keys / array indices.
pub type FieldPath = &'static [&'static str];

/// Values above this are assumed to be milliseconds.
const MILLIS_THRESHOLD: u64 = 10_000;

/// Walk `path` from `root`.
pub fn get_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(*segment),
    })
}

/// Trimmed, non-empty string at `path`.
pub fn get_str(root: &Value, path: &[&str]) -> Option<String> {
    get_path(root, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-negative integer at `path`, accepting numbers, floats and numeric strings.
pub fn get_u64(root: &Value, path: &[&str]) -> Option<u64> {
    get_path(root, path).and_then(|value| match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

/// First candidate path yielding a non-empty string.
pub fn first_str(root: &Value, paths: &[FieldPath]) -> Option<String> {
    paths.iter().find_map(|path| get_str(root, path))
}

/// First candidate path yielding a number.
pub fn first_u64(root: &Value, paths: &[FieldPath]) -> Option<u64> {
    paths.iter().find_map(|path| get_u64(root, path))
}

/// Image URLs from an array of plain strings or `{url|image|img|url_list}` objects.
pub fn parse_image_urls(raw: &Value) -> Vec<String> {
    const IMAGE_FIELDS: &[FieldPath] = &[&["url"], &["image"], &["img"], &["url_list", "0"]];

    raw.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                    _ => first_str(item, IMAGE_FIELDS),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// How a source reports durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Millis,
    /// Seconds, unless the magnitude is obviously milliseconds
    Guess,
}

impl DurationUnit {
    pub fn to_seconds(self, raw: u64) -> u32 {
        let secs = match self {
            DurationUnit::Millis => raw / 1000,
            DurationUnit::Guess if raw > MILLIS_THRESHOLD => raw / 1000,
            DurationUnit::Guess => raw,
        };
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

/// Candidate paths for every logical field of one upstream schema.
#[derive(Debug)]
pub struct FieldMap {
    pub title: &'static [FieldPath],
    pub cover: &'static [FieldPath],
    pub video: &'static [FieldPath],
    /// Arrays holding gallery images
    pub images: &'static [FieldPath],
    pub author: &'static [FieldPath],
    pub duration: &'static [FieldPath],
    pub duration_unit: DurationUnit,
    pub likes: &'static [FieldPath],
    pub comments: &'static [FieldPath],
    pub music: &'static [FieldPath],
}

impl FieldMap {
    /// Pull every logical field out of `data`.
    pub fn extract(&self, data: &Value) -> MediaFields {
        let images = self
            .images
            .iter()
            .filter_map(|path| get_path(data, path))
            .map(parse_image_urls)
            .find(|urls| !urls.is_empty())
            .unwrap_or_default();

        MediaFields {
            title: first_str(data, self.title),
            cover: first_str(data, self.cover),
            video_url: first_str(data, self.video),
            images,
            author: first_str(data, self.author),
            duration: first_u64(data, self.duration).map(|d| self.duration_unit.to_seconds(d)),
            likes: first_u64(data, self.likes),
            comments: first_u64(data, self.comments),
            music_url: first_str(data, self.music),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_path_indexes_arrays() {
        let v = json!({"video": {"play_addr": {"url_list": ["a", "b"]}}});
        assert_eq!(
            get_str(&v, &["video", "play_addr", "url_list", "1"]),
            Some("b".to_string())
        );
        assert_eq!(get_str(&v, &["video", "play_addr", "url_list", "5"]), None);
        assert_eq!(get_str(&v, &["video", "missing"]), None);
    }

    #[test]
    fn test_get_u64_coerces() {
        let v = json!({"a": 12, "b": "34", "c": 5.9, "d": -1, "e": "x"});
        assert_eq!(get_u64(&v, &["a"]), Some(12));
        assert_eq!(get_u64(&v, &["b"]), Some(34));
        assert_eq!(get_u64(&v, &["c"]), Some(5));
        assert_eq!(get_u64(&v, &["d"]), None);
        assert_eq!(get_u64(&v, &["e"]), None);
    }

    #[test]
    fn test_first_str_skips_blank() {
        let v = json!({"title": "  ", "desc": "hello", "item": {"desc": "nested"}});
        let paths: &[FieldPath] = &[&["title"], &["desc"], &["item", "desc"]];
        assert_eq!(first_str(&v, paths), Some("hello".to_string()));
        let nested: &[FieldPath] = &[&["title"], &["item", "desc"]];
        assert_eq!(first_str(&v, nested), Some("nested".to_string()));
    }

    #[test]
    fn test_parse_image_urls_mixed() {
        let v = json!([
            "https://a.jpg",
            {"url": "https://b.jpg"},
            {"url_list": ["https://c.jpg", "https://c2.jpg"]},
            {"img": ""},
            42
        ]);
        assert_eq!(
            parse_image_urls(&v),
            vec!["https://a.jpg", "https://b.jpg", "https://c.jpg"]
        );
        assert!(parse_image_urls(&Value::Null).is_empty());
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(DurationUnit::Guess.to_seconds(15), 15);
        assert_eq!(DurationUnit::Guess.to_seconds(15_300), 15);
        assert_eq!(DurationUnit::Millis.to_seconds(5_000), 5);
    }
}
