//! Storage operations
//!
//! Handles file system operations behind the HTTP routes: read, write,
//! directory listing and trees, moves, deletes and metadata. Every path
//! handed to these functions has already been resolved by `PathGuard`.

use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{FsError, FsResult};
use crate::storage::filesystem::{
    copy_recursive, directory_exists, directory_is_empty, display_name, path_exists, to_utc,
};
use crate::storage::results::{DirEntry, EntryKind, FileMetadata, TreeEntry};

/// Reads the full UTF-8 content of a file
pub fn read_file(path: &Path) -> FsResult<String> {
    if directory_exists(path) {
        return Err(FsError::InvalidInput(format!(
            "{} is a directory",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => {
            FsError::InvalidInput(format!("{} is not valid UTF-8 text", path.display()))
        }
        _ => FsError::from_io(e, path),
    })?;

    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(content)
}

/// Writes content to a file, creating or overwriting it.
///
/// The parent directory must already exist.
pub fn write_file(path: &Path, content: &str) -> FsResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            return Err(FsError::NotFound(parent.display().to_string()));
        }
        if !parent.is_dir() {
            return Err(FsError::NotADirectory(parent.display().to_string()));
        }
    }

    if directory_exists(path) {
        return Err(FsError::InvalidInput(format!(
            "{} is a directory",
            path.display()
        )));
    }

    fs::write(path, content).map_err(|e| FsError::from_io(e, path))?;

    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Creates a directory and any missing parents; succeeds if it already exists
pub fn create_directory(path: &Path) -> FsResult<()> {
    fs::create_dir_all(path).map_err(|e| FsError::from_io(e, path))?;
    info!("Created directory {}", path.display());
    Ok(())
}

pub(crate) fn require_directory(path: &Path) -> FsResult<()> {
    if !path_exists(path) {
        return Err(FsError::NotFound(path.display().to_string()));
    }
    if !directory_exists(path) {
        return Err(FsError::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Lists the immediate children of a directory
pub fn list_directory(path: &Path) -> FsResult<Vec<DirEntry>> {
    require_directory(path)?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| FsError::from_io(e, path))? {
        let entry = entry.map_err(|e| FsError::from_io(e, path))?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            kind: EntryKind::from_is_dir(entry.path().is_dir()),
        });
    }

    info!("Listed directory {} - {} entries", path.display(), entries.len());
    Ok(entries)
}

/// Builds the recursive tree below a directory, in enumeration order.
///
/// Symlinked directories are reported as directories but not descended into.
pub fn directory_tree(path: &Path) -> FsResult<Vec<TreeEntry>> {
    require_directory(path)?;
    build_tree(path)
}

fn build_tree(current: &Path) -> FsResult<Vec<TreeEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(current).map_err(|e| FsError::from_io(e, current))? {
        let entry = entry.map_err(|e| FsError::from_io(e, current))?;
        let entry_path = entry.path();
        let is_dir = entry_path.is_dir();
        let is_real_dir = entry
            .file_type()
            .map(|t| t.is_dir())
            .unwrap_or(false);

        let children = match (is_dir, is_real_dir) {
            (true, true) => Some(build_tree(&entry_path)?),
            (true, false) => Some(Vec::new()),
            _ => None,
        };

        entries.push(TreeEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            kind: EntryKind::from_is_dir(is_dir),
            children,
        });
    }

    Ok(entries)
}

/// Moves or renames a file or directory.
///
/// Refuses to overwrite an existing destination. Falls back to copy and
/// delete when the rename crosses filesystems.
pub fn move_path(source: &Path, destination: &Path) -> FsResult<()> {
    if !path_exists(source) {
        return Err(FsError::NotFound(source.display().to_string()));
    }
    if path_exists(destination) {
        return Err(FsError::AlreadyExists(destination.display().to_string()));
    }

    match fs::rename(source, destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                "Rename {} -> {} crosses devices, copying instead",
                source.display(),
                destination.display()
            );
            copy_recursive(source, destination).map_err(|e| FsError::from_io(e, destination))?;
            remove_path(source, true)?;
        }
        Err(e) => return Err(FsError::from_io(e, source)),
    }

    info!("Moved {} -> {}", source.display(), destination.display());
    Ok(())
}

/// Checks that `path` can be deleted with the given recursive flag
pub fn check_deletable(path: &Path, recursive: bool) -> FsResult<()> {
    if !path_exists(path) {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    if directory_exists(path) && !path.is_symlink() && !recursive {
        let empty = directory_is_empty(path).map_err(|e| FsError::from_io(e, path))?;
        if !empty {
            return Err(FsError::DirectoryNotEmpty(path.display().to_string()));
        }
    }

    Ok(())
}

/// Removes a file, symlink or directory.
///
/// Non-empty directories are only removed when `recursive` is set.
pub fn remove_path(path: &Path, recursive: bool) -> FsResult<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| FsError::from_io(e, path))?;

    let result = if metadata.is_dir() {
        if recursive {
            fs::remove_dir_all(path)
        } else {
            fs::remove_dir(path)
        }
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| FsError::from_io(e, path))?;

    info!(
        "Deleted {} ({}{})",
        path.display(),
        if metadata.is_dir() { "directory" } else { "file" },
        if recursive { ", recursive" } else { "" }
    );
    Ok(())
}

/// Returns type, size and timestamps of a path
pub fn get_metadata(path: &Path) -> FsResult<FileMetadata> {
    let metadata = fs::metadata(path).map_err(|e| FsError::from_io(e, path))?;

    let mtime = metadata
        .modified()
        .map(to_utc)
        .map_err(|e| FsError::from_io(e, path))?;
    let ctime = change_time(&metadata).unwrap_or(mtime);
    let birthtime = metadata.created().map(to_utc).unwrap_or(ctime);

    debug!("Fetched metadata for {}", display_name(path));

    Ok(FileMetadata {
        kind: EntryKind::from_is_dir(metadata.is_dir()),
        size: metadata.len(),
        mtime,
        ctime,
        birthtime,
        permissions: permission_bits(&metadata),
    })
}

#[cfg(unix)]
fn change_time(metadata: &fs::Metadata) -> Option<chrono::DateTime<chrono::Utc>> {
    use std::os::unix::fs::MetadataExt;
    chrono::DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
}

#[cfg(not(unix))]
fn change_time(_metadata: &fs::Metadata) -> Option<chrono::DateTime<chrono::Utc>> {
    None
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:o}", metadata.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &fs::Metadata) -> Option<String> {
    None
}
