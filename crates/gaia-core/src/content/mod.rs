//! Content library naming and listing rules.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CONTENT_LIST_LIMIT: u32 = 100;
pub const UPLOAD_CACHE_CONTROL: &str = "3600";

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._-]+").expect("file name pattern is valid"));

/// A stored object in the content bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    pub limit: u32,
    pub offset: u32,
    pub sort_column: String,
    pub sort_order: SortOrder,
}

impl ListOptions {
    /// First page, newest first.
    pub fn newest_first() -> Self {
        Self {
            limit: CONTENT_LIST_LIMIT,
            offset: 0,
            sort_column: "created_at".to_string(),
            sort_order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    pub upsert: bool,
    pub cache_control: String,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            upsert: false,
            cache_control: UPLOAD_CACHE_CONTROL.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no file selected")]
    NoFile,

    #[error("storage error: {0}")]
    Storage(#[from] crate::ports::RemoteError),
}

/// Replaces every run of characters outside `[a-zA-Z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// `<prefix>/<timestamp>-<safe name>`, with `:` and `.` in the timestamp
/// replaced by `-`.
pub fn upload_path(prefix: &str, file_name: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!(
        "{}/{}-{}",
        prefix.trim_end_matches('/'),
        stamp,
        sanitize_file_name(file_name)
    )
}
