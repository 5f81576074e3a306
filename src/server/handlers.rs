//! Route handlers
//!
//! Each handler resolves its path arguments through the `PathGuard`, runs
//! the storage operation on the blocking pool and shapes the JSON reply.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::confirm::delete_path as delete_with_confirmation;
use crate::error::{FsError, FsResult};
use crate::server::requests::{
    DeletePathRequest, EditFileRequest, MovePathRequest, PathRequest, SearchContentRequest,
    SearchFilesRequest, WriteFileRequest,
};
use crate::server::state::{AppState, SharedState};
use crate::storage::edit::edit_file as apply_file_edits;
use crate::storage::operations;
use crate::storage::results::{
    ContentSearchResult, DeleteOutcome, EditResult, FileMetadata, TreeEntry,
};
use crate::storage::search;

type HandlerResult<T> = Result<Json<T>, FsError>;

/// Run `job` on the blocking thread pool with access to the shared state
async fn run_blocking<T, F>(state: SharedState, job: F) -> Result<T, FsError>
where
    F: FnOnce(&AppState) -> FsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || job(state.as_ref()))
        .await
        .map_err(|e| FsError::Io(std::io::Error::other(e)))?
}

/// Health check handler
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn read_file(
    State(state): State<SharedState>,
    Json(req): Json<PathRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        let content = operations::read_file(&path)?;
        Ok(Json(json!({
            "path": path.display().to_string(),
            "content": content,
        })))
    })
    .await
}

pub async fn write_file(
    State(state): State<SharedState>,
    Json(req): Json<WriteFileRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        operations::write_file(&path, &req.content)?;
        Ok(Json(json!({
            "message": format!("Successfully wrote to {}", req.path),
        })))
    })
    .await
}

pub async fn edit_file(
    State(state): State<SharedState>,
    Json(req): Json<EditFileRequest>,
) -> HandlerResult<EditResult> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        apply_file_edits(&path, &req.edits, req.dry_run).map(Json)
    })
    .await
}

pub async fn create_directory(
    State(state): State<SharedState>,
    Json(req): Json<PathRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        operations::create_directory(&path)?;
        Ok(Json(json!({
            "message": format!("Successfully created directory {}", req.path),
        })))
    })
    .await
}

pub async fn list_directory(
    State(state): State<SharedState>,
    Json(req): Json<PathRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        let entries = operations::list_directory(&path)?;
        Ok(Json(json!({ "entries": entries })))
    })
    .await
}

pub async fn directory_tree(
    State(state): State<SharedState>,
    Json(req): Json<PathRequest>,
) -> HandlerResult<Vec<TreeEntry>> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        operations::directory_tree(&path).map(Json)
    })
    .await
}

pub async fn search_files(
    State(state): State<SharedState>,
    Json(req): Json<SearchFilesRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let base = state.guard.normalize(&req.path)?;
        let matches =
            search::search_files(&state.guard, &base, &req.pattern, &req.exclude_patterns)?;
        Ok(Json(json!({ "matches": matches })))
    })
    .await
}

pub async fn search_content(
    State(state): State<SharedState>,
    Json(req): Json<SearchContentRequest>,
) -> HandlerResult<ContentSearchResult> {
    run_blocking(state, move |state| {
        let base = state.guard.normalize(&req.path)?;
        search::search_content(
            &state.guard,
            &base,
            &req.query,
            req.recursive,
            &req.file_pattern,
        )
        .map(Json)
    })
    .await
}

pub async fn delete_path(
    State(state): State<SharedState>,
    Json(req): Json<DeletePathRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        let outcome = delete_with_confirmation(&state.broker, &path, req.recursive, req.token())?;

        let body = match outcome {
            DeleteOutcome::Pending { token, expires_at } => json!({
                "status": "pending",
                "confirmation_token": token,
                "expires_at": expires_at,
                "message": format!(
                    "Deleting {} requires confirmation: repeat the request with this confirmationToken before it expires",
                    req.path
                ),
            }),
            DeleteOutcome::Deleted { path } => json!({
                "status": "deleted",
                "path": path.display().to_string(),
                "message": format!("Successfully deleted {}", req.path),
            }),
        };
        Ok(Json(body))
    })
    .await
}

pub async fn move_path(
    State(state): State<SharedState>,
    Json(req): Json<MovePathRequest>,
) -> HandlerResult<Value> {
    run_blocking(state, move |state| {
        let source = state.guard.normalize(&req.source)?;
        let destination = state.guard.normalize(&req.destination)?;
        operations::move_path(&source, &destination)?;
        Ok(Json(json!({
            "message": format!("Successfully moved {} to {}", req.source, req.destination),
        })))
    })
    .await
}

pub async fn get_metadata(
    State(state): State<SharedState>,
    Json(req): Json<PathRequest>,
) -> HandlerResult<FileMetadata> {
    run_blocking(state, move |state| {
        let path = state.guard.normalize(&req.path)?;
        operations::get_metadata(&path).map(Json)
    })
    .await
}

pub async fn list_allowed_directories(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "allowed_directories": state.guard.roots().display_list(),
    }))
}
