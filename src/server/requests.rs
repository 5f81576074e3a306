//! Request bodies
//!
//! JSON payloads accepted by the routes. Field names follow the wire
//! format clients already send (`dryRun`, `excludePatterns`, ...).

use serde::Deserialize;

use crate::storage::edit::EditOperation;

fn default_true() -> bool {
    true
}

fn default_file_pattern() -> String {
    "*".to_string()
}

/// Body for routes taking a single path
#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct WriteFileRequest {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFileRequest {
    pub path: String,
    pub edits: Vec<EditOperation>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilesRequest {
    pub path: String,
    pub pattern: String,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContentRequest {
    pub path: String,
    pub query: String,
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePathRequest {
    pub path: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

impl DeletePathRequest {
    /// The token, treating a blank string as absent
    pub fn token(&self) -> Option<&str> {
        self.confirmation_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct MovePathRequest {
    pub source: String,
    pub destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_request_field_names() {
        let req: EditFileRequest = serde_json::from_str(
            r#"{"path":"/d/f","edits":[{"oldText":"a","newText":"b"}],"dryRun":true}"#,
        )
        .unwrap();
        assert!(req.dry_run);
        assert_eq!(req.edits[0].old_text, "a");
        assert_eq!(req.edits[0].new_text, "b");
    }

    #[test]
    fn test_search_content_defaults() {
        let req: SearchContentRequest =
            serde_json::from_str(r#"{"path":"/d","query":"q"}"#).unwrap();
        assert!(req.recursive);
        assert_eq!(req.file_pattern, "*");
    }

    #[test]
    fn test_blank_token_is_absent() {
        let req: DeletePathRequest =
            serde_json::from_str(r#"{"path":"/d","recursive":true,"confirmationToken":"  "}"#)
                .unwrap();
        assert_eq!(req.token(), None);
    }
}
