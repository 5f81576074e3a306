//! File system storage management
//!
//! Handles path validation, file operations, edits and searches.

pub mod edit;
pub mod filesystem;
pub mod operations;
pub mod results;
pub mod search;
pub mod validation;

// Re-export commonly used types
pub use edit::EditOperation;
pub use results::{DeleteOutcome, DirEntry, EntryKind, FileMetadata, TreeEntry};
pub use validation::{AllowedRoots, PathGuard};
