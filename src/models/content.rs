// src/models/content.rs

//! Canonical content model shared by every resolution strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Platform;

/// Title used when no source offers one.
pub const DEFAULT_TITLE: &str = "无标题";

/// Whether an item plays as a single video or shows an image gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

/// A resolved, directly playable piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub title: String,

    pub cover: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,

    pub author: String,

    pub platform: Platform,

    /// Length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,

    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl ContentItem {
    /// Build an item from raw fields, choosing gallery vs video by the image list.
    pub fn from_fields(fields: MediaFields, platform: Platform) -> Self {
        let images: Vec<String> = fields
            .images
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        let is_gallery = !images.is_empty();

        let cover = fields
            .cover
            .or_else(|| images.first().cloned())
            .unwrap_or_default();

        Self {
            title: fields.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            cover,
            video_url: if is_gallery { None } else { fields.video_url },
            author: fields.author.unwrap_or_default(),
            platform,
            duration: fields.duration,
            likes: fields.likes,
            comments: fields.comments,
            music_url: fields.music_url,
            kind: if is_gallery {
                MediaKind::Image
            } else {
                MediaKind::Video
            },
            images: is_gallery.then_some(images),
        }
    }

    /// Exactly one of a non-blank video URL or a non-empty image list, matching `kind`.
    pub fn is_valid(&self) -> bool {
        let has_video = self
            .video_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty());
        let has_images = self.images.as_ref().is_some_and(|v| !v.is_empty());

        match self.kind {
            MediaKind::Video => has_video && !has_images,
            MediaKind::Image => has_images && !has_video,
        }
    }

    /// Keep the item only if it satisfies [`ContentItem::is_valid`].
    pub fn validated(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }
}

/// Loosely typed fields pulled out of an upstream payload before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaFields {
    pub title: Option<String>,
    pub cover: Option<String>,
    pub video_url: Option<String>,
    pub images: Vec<String>,
    pub author: Option<String>,
    pub duration: Option<u32>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub music_url: Option<String>,
}

/// What a share link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Video,
    Note,
    Slides,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [Self::Video, Self::Note, Self::Slides];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Note => "note",
            Self::Slides => "slides",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-specific content identifier recovered from a URL or page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    pub id: String,
    pub kind: ReferenceKind,
}

/// JSON envelope returned by the HTTP surface and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_fields() -> MediaFields {
        MediaFields {
            title: Some("clip".into()),
            video_url: Some("https://cdn.example.com/v.mp4".into()),
            ..MediaFields::default()
        }
    }

    #[test]
    fn test_video_item_is_valid() {
        let item = ContentItem::from_fields(video_fields(), Platform::Douyin);
        assert_eq!(item.kind, MediaKind::Video);
        assert!(item.is_valid());
        // idempotent
        assert!(item.is_valid());
        assert!(item.clone().validated().is_some_and(|i| i.is_valid()));
    }

    #[test]
    fn test_images_win_over_video() {
        let mut fields = video_fields();
        fields.images = vec!["a.jpg".into(), " ".into(), "b.jpg".into()];
        let item = ContentItem::from_fields(fields, Platform::Douyin);

        assert_eq!(item.kind, MediaKind::Image);
        assert_eq!(item.images.as_deref(), Some(&["a.jpg".to_string(), "b.jpg".to_string()][..]));
        assert!(item.video_url.is_none());
        assert_eq!(item.cover, "a.jpg");
        assert!(item.is_valid());
    }

    #[test]
    fn test_empty_item_invalid_for_any_kind() {
        let mut item = ContentItem::from_fields(MediaFields::default(), Platform::TikTok);
        assert_eq!(item.title, DEFAULT_TITLE);
        assert!(!item.is_valid());

        item.kind = MediaKind::Image;
        item.images = Some(vec![]);
        assert!(!item.is_valid());
    }

    #[test]
    fn test_blank_video_url_invalid() {
        let mut fields = video_fields();
        fields.video_url = Some("   ".into());
        let item = ContentItem::from_fields(fields, Platform::Douyin);
        assert!(item.validated().is_none());
    }

    #[test]
    fn test_both_media_present_is_invalid() {
        let mut item = ContentItem::from_fields(video_fields(), Platform::Douyin);
        item.images = Some(vec!["a.jpg".into()]);
        assert!(!item.is_valid());
    }

    #[test]
    fn test_serialized_shape() {
        let item = ContentItem::from_fields(video_fields(), Platform::Douyin);
        let json = serde_json::to_value(ApiResponse::ok(item)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["type"], "video");
        assert_eq!(json["data"]["platform"], "抖音");
        assert_eq!(json["data"]["videoUrl"], "https://cdn.example.com/v.mp4");
        assert!(json["data"].get("images").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(ApiResponse::<()>::err("缺少 URL 参数")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "缺少 URL 参数");
        assert!(json.get("data").is_none());
    }
}
