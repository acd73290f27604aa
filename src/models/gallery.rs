//! Gallery item model.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::event::non_empty;
use super::{Document, FromDocument, PLACEHOLDER_IMAGE};
use crate::errors::{DecodeError, ValidationError};

/// URL fragments that identify a hosted video.
const VIDEO_HOST_MARKERS: [&str; 2] = ["youtube", "youtu.be"];

/// Caption stored when the admin leaves it blank.
pub const DEFAULT_CAPTION: &str = "Untitled";

/// Category of items stored without one.
pub const DEFAULT_CATEGORY: &str = "general";

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*((youtu\.be/)|(v/)|(/u/\w/)|(embed/)|(watch\?))\??v?=?([^#&?]*).*")
        .expect("valid YouTube URL pattern")
});

/// Whether an item is a photo or an embedded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Infer the kind from the media URL.
    pub fn infer(url: &str) -> Self {
        if VIDEO_HOST_MARKERS.iter().any(|m| url.contains(m)) {
            MediaKind::Video
        } else {
            MediaKind::Photo
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [MediaKind::Photo, MediaKind::Video]
            .into_iter()
            .find(|kind| kind.as_str() == s)
    }
}

/// A photo or video in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    pub caption: String,
    pub kind: MediaKind,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}

impl GalleryItem {
    /// The 11 character YouTube id of a video item.
    pub fn youtube_id(&self) -> Option<&str> {
        if self.kind != MediaKind::Video {
            return None;
        }
        YOUTUBE_ID
            .captures(&self.url)
            .and_then(|c| c.get(7))
            .map(|m| m.as_str())
            .filter(|id| id.len() == 11)
    }

    pub fn embed_url(&self) -> Option<String> {
        self.youtube_id()
            .map(|id| format!("https://www.youtube.com/embed/{}", id))
    }

    /// Image shown in the grid: the photo itself, the video thumbnail, or
    /// the placeholder when neither is known.
    pub fn display_image(&self) -> String {
        match self.kind {
            MediaKind::Photo => self.url.clone(),
            MediaKind::Video => self
                .youtube_id()
                .map(|id| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        }
    }
}

impl FromDocument for GalleryItem {
    const COLLECTION: &'static str = "gallery";

    fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        let url = doc.required_str("url")?;
        let kind = match doc.optional_str("kind")? {
            None => MediaKind::infer(&url),
            Some(raw) => MediaKind::parse(&raw).ok_or_else(|| DecodeError::InvalidField {
                field: "kind",
                reason: format!("unknown media kind {:?}", raw),
            })?,
        };

        Ok(Self {
            id: doc.id.clone(),
            caption: doc.optional_str("caption")?.unwrap_or_default(),
            url,
            kind,
            category: doc
                .optional_str("category")?
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: doc.optional_str("date")?,
            view_count: doc.optional_u64("viewCount")?.unwrap_or(0),
            created_at: doc.created_at,
        })
    }
}

/// Admin form input for a new gallery item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryDraft {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Validated gallery fields, ready to be written. The kind is fixed here
/// and never revisited.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGalleryItem {
    pub url: String,
    pub caption: String,
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl GalleryDraft {
    pub fn validate(self) -> Result<NewGalleryItem, ValidationError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::Required("url"));
        }

        Ok(NewGalleryItem {
            kind: MediaKind::infer(url),
            url: url.to_string(),
            caption: non_empty(self.caption).unwrap_or_else(|| DEFAULT_CAPTION.to_string()),
            category: non_empty(self.category),
        })
    }
}

impl NewGalleryItem {
    pub fn into_item(self, id: String, created_at: DateTime<Utc>) -> GalleryItem {
        GalleryItem {
            id,
            url: self.url,
            caption: self.caption,
            kind: self.kind,
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: None,
            view_count: 0,
            created_at,
        }
    }
}
