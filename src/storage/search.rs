//! File and content search
//!
//! Recursive walks below an allowed directory. Results are re-checked
//! against the allowed roots so a symlink can never leak an outside path.

use glob::{MatchOptions, Pattern};
use log::{info, warn};
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use crate::error::{FsError, FsResult};
use crate::storage::filesystem::{display_name, file_exists};
use crate::storage::operations::require_directory;
use crate::storage::results::{ContentMatch, ContentSearchResult, SearchWarning};
use crate::storage::validation::PathGuard;

/// Returned in place of an empty match list
pub const NO_MATCHES: &str = "No matches found";

/// Exclude pattern matched component-wise from the right end of a path,
/// so `*/tmp*` matches any directory named `tmp…` whatever its depth.
#[derive(Debug)]
pub struct ExcludeGlob {
    parts: Vec<Pattern>,
    anchored: bool,
}

impl ExcludeGlob {
    pub fn new(raw: &str) -> FsResult<Self> {
        let parts = raw
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| {
                Pattern::new(part).map_err(|e| {
                    FsError::InvalidInput(format!("invalid exclude pattern {raw}: {e}"))
                })
            })
            .collect::<FsResult<Vec<_>>>()?;

        if parts.is_empty() {
            return Err(FsError::InvalidInput(format!(
                "invalid exclude pattern {raw}: empty"
            )));
        }

        Ok(Self {
            parts,
            anchored: raw.starts_with('/'),
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        let names: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        if names.len() < self.parts.len() || (self.anchored && names.len() != self.parts.len()) {
            return false;
        }

        let offset = names.len() - self.parts.len();
        self.parts
            .iter()
            .zip(&names[offset..])
            .all(|(pattern, name)| pattern.matches(name))
    }
}

/// Find files and directories whose name contains `pattern`, case-insensitively.
///
/// Directories matching any exclude glob are skipped with their whole subtree.
pub fn search_files(
    guard: &PathGuard,
    base: &Path,
    pattern: &str,
    exclude_patterns: &[String],
) -> FsResult<Vec<String>> {
    require_directory(base)?;

    let excludes = exclude_patterns
        .iter()
        .map(|raw| ExcludeGlob::new(raw))
        .collect::<FsResult<Vec<_>>>()?;
    let needle = pattern.to_lowercase();

    let walker = WalkDir::new(base)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && excludes.iter().any(|g| g.matches(entry.path())))
        });

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry during file search: {e}");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.contains(&needle) && guard.is_allowed(entry.path()) {
            matches.push(entry.path().display().to_string());
        }
    }

    info!(
        "File search for '{}' under {} - {} matches",
        pattern,
        base.display(),
        matches.len()
    );

    if matches.is_empty() {
        matches.push(NO_MATCHES.to_string());
    }
    Ok(matches)
}

/// Find lines containing `query`, case-insensitively, in files whose name
/// matches `file_pattern`.
///
/// Files that cannot be read as text are skipped and reported as warnings.
pub fn search_content(
    guard: &PathGuard,
    base: &Path,
    query: &str,
    recursive: bool,
    file_pattern: &str,
) -> FsResult<ContentSearchResult> {
    if query.is_empty() {
        return Err(FsError::InvalidInput("query cannot be empty".into()));
    }
    if !base.exists() {
        return Err(FsError::NotFound(base.display().to_string()));
    }

    let file_glob = Pattern::new(file_pattern).map_err(|e| {
        FsError::InvalidInput(format!("invalid file pattern {file_pattern}: {e}"))
    })?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let needle = query.to_lowercase();

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut result = ContentSearchResult::default();

    for entry in WalkDir::new(base).max_depth(max_depth).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let file_path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!("Skipping {file_path} during content search: {e}");
                result.warnings.push(SearchWarning {
                    file_path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        if !file_exists(path)
            || !file_glob.matches_with(&display_name(path), options)
            || !guard.is_allowed(path)
        {
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {} during content search: {}", path.display(), e);
                result.warnings.push(SearchWarning {
                    file_path: path.display().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for (index, line) in content.lines().enumerate() {
            if line.to_lowercase().contains(&needle) {
                result.matches.push(ContentMatch {
                    file_path: path.display().to_string(),
                    line_number: index + 1,
                    line_content: line.to_string(),
                });
            }
        }
    }

    info!(
        "Content search for '{}' under {} - {} matches, {} skipped",
        query,
        base.display(),
        result.matches.len(),
        result.warnings.len()
    );
    Ok(result)
}
