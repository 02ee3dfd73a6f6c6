//! Records persisted in the JSON data files.
//!
//! Every file is a flat array of objects. The structs here mirror the exact
//! field names the front-end reads, so renaming a field is a breaking change
//! for the site.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Artist placeholder used when the uploader name cannot be found.
pub const UNKNOWN_ARTIST: &str = "不明";
pub const CATEGORY_VOCALOID: &str = "VOCALOID";
pub const CATEGORY_OTHER: &str = "その他";

/// Key patched in by the thumbnail passes.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// One video as written by the playlist generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub platform: Platform,
    pub category: String,
    /// Day the record was generated, `YYYY-MM-DD`.
    pub date_added: String,
    /// Always written, even when unset, so the front-end sees `null`.
    pub rank: Option<u32>,
    pub views: u64,
    pub likes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub artist: String,
    pub vocaloid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Lightweight entry produced by the HTML importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub artist: String,
}
