//! Error types
//!
//! Defines the error taxonomy shared by path validation, file operations
//! and the delete confirmation workflow.

use std::fmt;
use std::io;
use std::path::Path;

/// Filesystem server errors
#[derive(Debug)]
pub enum FsError {
    /// Path resolved outside every allowed directory
    AccessDenied { path: String, allowed: Vec<String> },
    NotFound(String),
    PermissionDenied(String),
    NotADirectory(String),
    AlreadyExists(String),
    DirectoryNotEmpty(String),
    /// An edit's `oldText` had no match in the progressively edited content
    EditMismatch(String),
    InvalidToken,
    Expired,
    ParameterMismatch,
    InvalidInput(String),
    Io(io::Error),
}

impl FsError {
    /// Classify an I/O error raised while operating on `path`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let display = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(display),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(display),
            io::ErrorKind::NotADirectory => FsError::NotADirectory(display),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(display),
            io::ErrorKind::DirectoryNotEmpty => FsError::DirectoryNotEmpty(display),
            _ => FsError::Io(err),
        }
    }

    /// Stable machine-readable code for the error
    pub fn code(&self) -> &'static str {
        match self {
            FsError::AccessDenied { .. } => "ACCESS_DENIED",
            FsError::NotFound(_) => "NOT_FOUND",
            FsError::PermissionDenied(_) => "PERMISSION_DENIED",
            FsError::NotADirectory(_) => "NOT_A_DIRECTORY",
            FsError::AlreadyExists(_) => "ALREADY_EXISTS",
            FsError::DirectoryNotEmpty(_) => "DIRECTORY_NOT_EMPTY",
            FsError::EditMismatch(_) => "EDIT_MISMATCH",
            FsError::InvalidToken => "INVALID_TOKEN",
            FsError::Expired => "EXPIRED",
            FsError::ParameterMismatch => "PARAMETER_MISMATCH",
            FsError::InvalidInput(_) => "INVALID_INPUT",
            FsError::Io(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, FsError::PermissionDenied(_))
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::AccessDenied { path, allowed } => write!(
                f,
                "Access denied: {} is outside allowed directories ({})",
                path,
                allowed.join(", ")
            ),
            FsError::NotFound(p) => write!(f, "Path not found: {}", p),
            FsError::PermissionDenied(p) => write!(f, "Permission denied: {}", p),
            FsError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            FsError::AlreadyExists(p) => write!(f, "Path already exists: {}", p),
            FsError::DirectoryNotEmpty(p) => write!(
                f,
                "Directory not empty: {} (use recursive=true to delete its contents)",
                p
            ),
            FsError::EditMismatch(text) => write!(f, "oldText not found in content: {}", text),
            FsError::InvalidToken => write!(f, "Invalid or unknown confirmation token"),
            FsError::Expired => write!(f, "Confirmation token has expired; request a new one"),
            FsError::ParameterMismatch => write!(
                f,
                "Confirmation token does not match the requested path or recursive flag"
            ),
            FsError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            FsError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        FsError::Io(error)
    }
}

/// Result alias used throughout the storage and confirmation modules
pub type FsResult<T> = Result<T, FsError>;
