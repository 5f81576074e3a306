//! Path validation
//!
//! Resolves client-supplied paths and confines them to the allowed
//! directory trees. Every storage operation goes through [`PathGuard`]
//! before touching the filesystem.

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{FsError, FsResult};

/// Maximum accepted length of a raw path argument
const MAX_PATH_INPUT_LEN: usize = 4096;

/// Symlinks followed while resolving the not-yet-existing tail of a path
const MAX_SYMLINK_HOPS: usize = 40;

/// Ordered set of canonical directories, fixed at startup
#[derive(Debug, Clone)]
pub struct AllowedRoots {
    roots: Vec<PathBuf>,
}

impl AllowedRoots {
    /// Roots are expected to already be canonical absolute paths.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether `path` lies inside (or is) one of the roots.
    ///
    /// Compares whole path components, so `/home/user2` is not inside `/home/user`.
    pub fn contains(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| is_within(path, root))
    }

    /// Roots rendered for error messages and the listing endpoint
    pub fn display_list(&self) -> Vec<String> {
        self.roots
            .iter()
            .map(|root| root.display().to_string())
            .collect()
    }
}

#[cfg(not(windows))]
fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(windows)]
fn is_within(path: &Path, root: &Path) -> bool {
    let mut path_components = path.components();
    root.components().all(|root_component| {
        path_components.next().is_some_and(|c| {
            c.as_os_str()
                .to_string_lossy()
                .eq_ignore_ascii_case(&root_component.as_os_str().to_string_lossy())
        })
    })
}

/// Confines requested paths to the allowed roots
#[derive(Debug, Clone)]
pub struct PathGuard {
    roots: AllowedRoots,
}

impl PathGuard {
    pub fn new(roots: AllowedRoots) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &AllowedRoots {
        &self.roots
    }

    /// Resolve `requested` to a canonical absolute path inside an allowed root.
    ///
    /// The path does not need to exist; only its longest existing ancestor is
    /// canonicalized (following symlinks) and the rest is appended lexically.
    pub fn normalize(&self, requested: &str) -> FsResult<PathBuf> {
        if !is_valid_path_input(requested) {
            return Err(FsError::InvalidInput(format!(
                "path must be non-empty, at most {MAX_PATH_INPUT_LEN} bytes and free of NUL"
            )));
        }

        let expanded = expand_home(requested);
        let resolved = resolve_path(&expanded).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidInput => FsError::InvalidInput(e.to_string()),
            _ => FsError::from_io(e, &expanded),
        })?;

        if self.roots.contains(&resolved) {
            debug!("Resolved {} -> {}", requested, resolved.display());
            Ok(resolved)
        } else {
            warn!(
                "Rejected path {} (resolved to {}) outside allowed directories",
                requested,
                resolved.display()
            );
            Err(FsError::AccessDenied {
                path: resolved.display().to_string(),
                allowed: self.roots.display_list(),
            })
        }
    }

    /// Re-check an already resolved path, e.g. one reached while walking a tree.
    pub fn is_allowed(&self, path: &Path) -> bool {
        match resolve_path(path) {
            Ok(resolved) => self.roots.contains(&resolved),
            Err(_) => false,
        }
    }
}

fn is_valid_path_input(input: &str) -> bool {
    !input.trim().is_empty() && input.len() <= MAX_PATH_INPUT_LEN && !input.contains('\0')
}

/// Expand a leading `~` or `~/` to the current user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Make `requested` absolute and resolve it as far as the filesystem allows.
///
/// The longest existing ancestor is canonicalized; remaining components are
/// applied lexically (`.` dropped, `..` pops). A remaining component that is
/// a symlink (necessarily dangling) is replaced by its target and resolution
/// restarts from there.
pub fn resolve_path(requested: &Path) -> io::Result<PathBuf> {
    resolve_with_hops(requested, 0)
}

fn resolve_with_hops(requested: &Path, hops: usize) -> io::Result<PathBuf> {
    let absolute = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        std::env::current_dir()?.join(requested)
    };

    for ancestor in absolute.ancestors() {
        let Ok(canonical) = ancestor.canonicalize() else {
            continue;
        };

        let tail = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
        let mut resolved = canonical;
        let mut components = tail.components();
        while let Some(component) = components.next() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    if !is_symlink(&resolved) {
                        continue;
                    }
                    if hops >= MAX_SYMLINK_HOPS {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("too many levels of symbolic links at {}", resolved.display()),
                        ));
                    }
                    let target = fs::read_link(&resolved)?;
                    resolved.pop();
                    let redirected = resolved.join(target).join(components.as_path());
                    return resolve_with_hops(&redirected, hops + 1);
                }
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        return Ok(resolved);
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("cannot resolve {}", absolute.display()),
    ))
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}
