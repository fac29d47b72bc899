/// Uploaded media models
///
/// This module describes the metadata records kept for uploaded files and the
/// upload policy (size limit, accepted formats, stored file naming) for each
/// media kind. The file bytes themselves live on disk under the upload
/// directory; only metadata is stored in the collections.
///
/// # Media kinds
///
/// | Kind  | Collection | Directory | Limit  | Extensions                     |
/// |-------|------------|-----------|--------|--------------------------------|
/// | Image | `images`   | `images/` | 10 MB  | jpeg jpg png gif webp svg      |
/// | Video | `videos`   | `videos/` | 100 MB | mp4 avi mov wmv flv            |
/// | Logo  | `logo`     | `logos/`  | 5 MB   | jpeg jpg png gif svg           |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

const MB: usize = 1024 * 1024;

/// Kind of uploaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Logo,
}

impl MediaKind {
    /// Multipart field carrying the file
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Logo => "logo",
        }
    }

    /// Subdirectory under the upload root
    pub fn directory(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Logo => "logos",
        }
    }

    /// Maximum accepted file size in bytes
    pub fn max_bytes(&self) -> usize {
        match self {
            MediaKind::Image => 10 * MB,
            MediaKind::Video => 100 * MB,
            MediaKind::Logo => 5 * MB,
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["jpeg", "jpg", "png", "gif", "webp", "svg"],
            MediaKind::Video => &["mp4", "avi", "mov", "wmv", "flv"],
            MediaKind::Logo => &["jpeg", "jpg", "png", "gif", "svg"],
        }
    }

    /// Checks whether a file is acceptable for this kind
    ///
    /// The extension must be in the allow-list. For videos the content type
    /// must be `video/*`; for images and logos it must mention one of the
    /// allowed formats (e.g. `image/png`, `image/svg+xml`).
    pub fn accepts(&self, original_name: &str, content_type: &str) -> bool {
        let Some(ext) = extension_of(original_name) else {
            return false;
        };

        if !self.extensions().contains(&ext.as_str()) {
            return false;
        }

        let content_type = content_type.to_ascii_lowercase();
        match self {
            MediaKind::Video => content_type.starts_with("video/"),
            MediaKind::Image | MediaKind::Logo => self
                .extensions()
                .iter()
                .any(|allowed| content_type.contains(allowed)),
        }
    }

    /// Builds the stored file name: `<kind>-<millis>-<suffix>.<ext>`
    pub fn stored_name(&self, original_name: &str, suffix: u32) -> String {
        let prefix = self.field_name();
        let millis = Utc::now().timestamp_millis();

        match extension_of(original_name) {
            Some(ext) => format!("{prefix}-{millis}-{suffix}.{ext}"),
            None => format!("{prefix}-{millis}-{suffix}"),
        }
    }

    /// Public URL path of a stored file
    pub fn public_path(&self, filename: &str) -> String {
        format!("/uploads/{}/{}", self.directory(), filename)
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Image record as stored in the `images` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,

    /// Stored file name under `images/`
    pub filename: String,

    /// Name of the file as uploaded
    pub original_name: String,

    /// Alternative text
    #[serde(default)]
    pub alt: String,

    #[serde(default = "default_category")]
    pub category: String,

    /// Public URL path
    pub path: String,

    /// Size in bytes
    pub size: u64,

    #[serde(default = "Utc::now")]
    pub uploaded_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    "general".to_string()
}

/// Input for updating image metadata
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateImage {
    pub alt: Option<String>,
    pub category: Option<String>,
}

/// Video record as stored in the `videos` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,

    pub filename: String,

    pub original_name: String,

    /// Display title, defaults to the original file name
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub path: String,

    pub size: u64,

    #[serde(default = "Utc::now")]
    pub uploaded_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for updating video metadata
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateVideo {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Current site logo
///
/// Stored as `{}` when no logo is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Image {
    /// Applies a metadata update, ignoring empty values
    pub fn apply(&mut self, update: UpdateImage) {
        if let Some(alt) = update.alt.filter(|s| !s.is_empty()) {
            self.alt = alt;
        }
        if let Some(category) = update.category.filter(|s| !s.is_empty()) {
            self.category = category;
        }
        self.updated_at = Some(Utc::now());
    }
}

impl Video {
    /// Applies a metadata update
    pub fn apply(&mut self, update: UpdateVideo) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_at = Some(Utc::now());
    }
}

impl Logo {
    /// Checks whether a logo is currently set
    pub fn is_set(&self) -> bool {
        self.filename.is_some()
    }
}
