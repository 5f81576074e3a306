//! Storage result types
//!
//! Defines result structures returned by storage operations. All of them
//! serialize directly into the HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn from_is_dir(is_dir: bool) -> Self {
        if is_dir {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// One immediate child of a listed directory
#[derive(Debug, Clone, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Node of a recursive directory tree; `children` is present only for directories
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeEntry>>,
}

/// Result of an edit, applied or previewed
#[derive(Debug, Clone, Serialize)]
pub struct EditResult {
    pub path: String,
    pub dry_run: bool,
    pub diff: String,
}

/// One line matching a content search
#[derive(Debug, Clone, Serialize)]
pub struct ContentMatch {
    pub file_path: String,
    pub line_number: usize,
    pub line_content: String,
}

/// A file skipped during content search, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct SearchWarning {
    pub file_path: String,
    pub reason: String,
}

/// Result of a content search
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentSearchResult {
    pub matches: Vec<ContentMatch>,
    pub warnings: Vec<SearchWarning>,
}

/// Metadata of a single path
#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub ctime: DateTime<Utc>,
    /// Creation time where the platform reports it, change time otherwise
    pub birthtime: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
}

/// Outcome of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Confirmation required; the caller must repeat the request with `token`
    Pending {
        token: String,
        expires_at: DateTime<Utc>,
    },
    Deleted { path: PathBuf },
}
