//! Catalog types returned by the media backend.
//!
//! A catalog record is one media item as returned by the search, window and
//! detail endpoints. Stored objects (covers, archives) are resolved through
//! a separate lookup that returns [`OssListing`].

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::de::{opt_millis_lenient, opt_string_lenient, string_lenient};

/// Title shown when a record has none.
pub const UNTITLED: &str = "Untitled";

/// Coarse media type of a catalog record, derived from its `fileType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Video content.
    Video,
    /// Still images and galleries.
    Image,
    /// Music and other audio.
    Audio,
    /// Compressed bundles.
    Archive,
    /// Text documents.
    Document,
    /// Anything the backend labels with an unknown or missing type.
    #[default]
    Other,
}

impl FileType {
    /// Classify a raw backend `fileType` value. Matching is case-insensitive.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "VIDEO" | "MP4" | "MOVIE" => Self::Video,
            "IMAGE" | "PICTURE" | "PHOTO" | "IMG" => Self::Image,
            "AUDIO" | "MUSIC" | "MP3" => Self::Audio,
            "ZIP" | "RAR" | "7Z" | "ARCHIVE" | "FILE" => Self::Archive,
            "DOC" | "DOCUMENT" | "TEXT" | "TXT" | "PDF" => Self::Document,
            _ => Self::Other,
        }
    }

    /// Emoji shown in listings and digests.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Video => "🎬",
            Self::Image => "🖼️",
            Self::Audio => "🎵",
            Self::Archive => "📦",
            Self::Document => "📄",
            Self::Other => "📁",
        }
    }
}

/// One media item from the catalog backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Backend primary key.
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,

    /// Public short code used by the `/cid` command.
    #[serde(default, deserialize_with = "opt_string_lenient", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Raw type label, e.g. `VIDEO`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// Last update as epoch milliseconds.
    #[serde(default, deserialize_with = "opt_millis_lenient", skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,

    /// Cover image: either an absolute URL or a stored-object id.
    #[serde(default, deserialize_with = "opt_string_lenient", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netdisk_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netdisk_url: Option<String>,
}

impl CatalogRecord {
    /// Creates a record with only an id, mostly useful in tests.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Sets the public code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the raw file type.
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Sets the update timestamp in epoch milliseconds.
    pub fn with_update_time(mut self, millis: i64) -> Self {
        self.update_time = Some(millis);
        self
    }

    /// The identifier shown to users: `code` when present and non-empty,
    /// `id` otherwise.
    pub fn display_code(&self) -> &str {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => &self.id,
        }
    }

    /// The title, or [`UNTITLED`].
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => UNTITLED,
        }
    }

    /// Classified media type.
    pub fn kind(&self) -> FileType {
        self.file_type
            .as_deref()
            .map(FileType::from_raw)
            .unwrap_or_default()
    }

    /// Update time in the local timezone, if present and representable.
    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        let millis = self.update_time?;
        Local.timestamp_millis_opt(millis).single()
    }
}

/// A stored binary object resolved to a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OssObject {
    pub url: String,
    #[serde(default)]
    pub original_name: Option<String>,
}

/// Envelope returned by the stored-object lookup endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OssListing {
    /// Application-level status code; `200` on success.
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub data: Vec<OssObject>,
}

impl OssListing {
    /// Whether the backend reported success.
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }
}
