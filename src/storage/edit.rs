//! Text edits
//!
//! Applies ordered find/replace edits to a file and renders unified diffs.

use log::info;
use serde::Deserialize;
use similar::TextDiff;
use std::fs;
use std::path::Path;

use crate::error::{FsError, FsResult};
use crate::storage::operations::read_file;
use crate::storage::results::EditResult;

/// Longest `oldText` prefix echoed back in a mismatch error
const MISMATCH_PREVIEW_CHARS: usize = 50;

/// A single exact-match replacement
#[derive(Debug, Clone, Deserialize)]
pub struct EditOperation {
    #[serde(rename = "oldText")]
    pub old_text: String,
    #[serde(rename = "newText")]
    pub new_text: String,
}

impl EditOperation {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }
}

/// Apply `edits` in order, each against the result of the previous one.
///
/// Only the first occurrence of each `old_text` is replaced. Nothing is
/// returned unless every edit matched.
pub fn apply_edits(original: &str, edits: &[EditOperation]) -> FsResult<String> {
    let mut modified = original.to_string();

    for edit in edits {
        if edit.old_text.is_empty() {
            return Err(FsError::InvalidInput("oldText cannot be empty".into()));
        }
        if !modified.contains(&edit.old_text) {
            let preview: String = edit.old_text.chars().take(MISMATCH_PREVIEW_CHARS).collect();
            return Err(FsError::EditMismatch(preview));
        }
        modified = modified.replacen(&edit.old_text, &edit.new_text, 1);
    }

    Ok(modified)
}

/// Unified diff between two versions of a text
pub fn unified_diff(original: &str, modified: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);
    diff.unified_diff()
        .context_radius(3)
        .header("original", "modified")
        .to_string()
}

/// Edit a file in place, or only preview the diff when `dry_run` is set.
///
/// The file is written once, after all edits have matched.
pub fn edit_file(path: &Path, edits: &[EditOperation], dry_run: bool) -> FsResult<EditResult> {
    let original = read_file(path)?;
    let modified = apply_edits(&original, edits)?;
    let diff = unified_diff(&original, &modified);

    if !dry_run {
        fs::write(path, &modified).map_err(|e| FsError::from_io(e, path))?;
        info!("Applied {} edit(s) to {}", edits.len(), path.display());
    }

    Ok(EditResult {
        path: path.display().to_string(),
        dry_run,
        diff,
    })
}
