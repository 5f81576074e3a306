use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

use rax_fs_server::server::{AppState, build_router};
use rax_fs_server::storage::AllowedRoots;

// Helper to build an app confined to a fresh temporary directory
fn setup_test_env() -> (TempDir, PathBuf, Router) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let state = AppState::with_roots(AllowedRoots::new(vec![root.clone()]));
    (dir, root, build_router(state))
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// Helper to send a JSON request and decode the JSON reply
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

#[tokio::test]
async fn test_health() {
    let (_dir, _root, app) = setup_test_env();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_allowed_directories() {
    let (_dir, root, app) = setup_test_env();
    let (status, body) = send(&app, "GET", "/list_allowed_directories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed_directories"], json!([path_str(&root)]));
}

#[tokio::test]
async fn test_write_read_round_trip() {
    let (_dir, root, app) = setup_test_env();
    fs::create_dir(root.join("sub")).unwrap();
    let file = path_str(&root.join("sub/file.txt"));

    let (status, _) = post(&app, "/write_file", json!({"path": file, "content": "hello"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, "/read_file", json!({"path": file})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "hello");
}

#[tokio::test]
async fn test_traversal_outside_root_is_forbidden() {
    let (_dir, root, app) = setup_test_env();
    let escape = format!("{}/../etc/passwd", path_str(&root));

    let (status, body) = post(&app, "/read_file", json!({"path": escape})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "ACCESS_DENIED");
    assert_eq!(body["allowed_directories"], json!([path_str(&root)]));
}

#[cfg(unix)]
#[tokio::test]
async fn test_write_through_dangling_symlink_is_forbidden() {
    let (_dir, root, app) = setup_test_env();
    let outside = TempDir::new().unwrap();
    let target = outside.path().join("escaped.txt");
    std::os::unix::fs::symlink(&target, root.join("link")).unwrap();

    let (status, body) = post(
        &app,
        "/write_file",
        json!({"path": path_str(&root.join("link")), "content": "escaped"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "ACCESS_DENIED");
    assert!(!target.exists());
}

#[tokio::test]
async fn test_read_missing_file_is_not_found() {
    let (_dir, root, app) = setup_test_env();
    let (status, body) = post(
        &app,
        "/read_file",
        json!({"path": path_str(&root.join("missing.txt"))}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_edit_dry_run_and_apply() {
    let (_dir, root, app) = setup_test_env();
    let file = root.join("doc.txt");
    fs::write(&file, "alpha\nbeta\n").unwrap();

    let request = json!({
        "path": path_str(&file),
        "edits": [{"oldText": "beta", "newText": "gamma"}],
        "dryRun": true,
    });
    let (status, body) = post(&app, "/edit_file", request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["diff"].as_str().unwrap().contains("+gamma"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "alpha\nbeta\n");

    let request = json!({
        "path": path_str(&file),
        "edits": [{"oldText": "beta", "newText": "gamma"}],
    });
    let (status, _) = post(&app, "/edit_file", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fs::read_to_string(&file).unwrap(), "alpha\ngamma\n");
}

#[tokio::test]
async fn test_edit_mismatch_leaves_file_unchanged() {
    let (_dir, root, app) = setup_test_env();
    let file = root.join("doc.txt");
    fs::write(&file, "one two three").unwrap();

    let request = json!({
        "path": path_str(&file),
        "edits": [
            {"oldText": "one", "newText": "1"},
            {"oldText": "four", "newText": "4"},
            {"oldText": "three", "newText": "3"},
        ],
    });
    let (status, body) = post(&app, "/edit_file", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "EDIT_MISMATCH");
    assert!(body["message"].as_str().unwrap().contains("four"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "one two three");
}

#[tokio::test]
async fn test_directory_listing_and_tree() {
    let (_dir, root, app) = setup_test_env();
    let (status, _) = post(
        &app,
        "/create_directory",
        json!({"path": path_str(&root.join("a/b"))}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    fs::write(root.join("a/b/leaf.txt"), "").unwrap();

    let (status, body) = post(&app, "/list_directory", json!({"path": path_str(&root)})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([{"name": "a", "type": "directory"}]));

    let (status, body) = post(&app, "/directory_tree", json!({"path": path_str(&root)})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "name": "a",
            "type": "directory",
            "children": [{
                "name": "b",
                "type": "directory",
                "children": [{"name": "leaf.txt", "type": "file"}],
            }],
        }])
    );
}

#[tokio::test]
async fn test_search_files_with_exclusions() {
    let (_dir, root, app) = setup_test_env();
    fs::write(root.join("a.log"), "").unwrap();
    fs::create_dir(root.join("tmp")).unwrap();
    fs::write(root.join("tmp/b.log"), "").unwrap();

    let request = json!({
        "path": path_str(&root),
        "pattern": "log",
        "excludePatterns": ["*/tmp*"],
    });
    let (status, body) = post(&app, "/search_files", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"], json!([path_str(&root.join("a.log"))]));

    let request = json!({"path": path_str(&root), "pattern": "zzz"});
    let (_, body) = post(&app, "/search_files", request).await;
    assert_eq!(body["matches"], json!(["No matches found"]));
}

#[tokio::test]
async fn test_search_content() {
    let (_dir, root, app) = setup_test_env();
    fs::write(root.join("notes.md"), "todo: call\nnothing\nTODO: write\n").unwrap();

    let request = json!({"path": path_str(&root), "query": "todo", "filePattern": "*.md"});
    let (status, body) = post(&app, "/search_content", request).await;
    assert_eq!(status, StatusCode::OK);

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["line_number"], 1);
    assert_eq!(matches[1]["line_content"], "TODO: write");
    assert_eq!(body["warnings"], json!([]));
}

#[tokio::test]
async fn test_move_and_metadata() {
    let (_dir, root, app) = setup_test_env();
    fs::write(root.join("from.txt"), "abc").unwrap();

    let request = json!({
        "source": path_str(&root.join("from.txt")),
        "destination": path_str(&root.join("to.txt")),
    });
    let (status, _) = post(&app, "/move_path", request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!root.join("from.txt").exists());

    let (status, body) = post(
        &app,
        "/get_metadata",
        json!({"path": path_str(&root.join("to.txt"))}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "file");
    assert_eq!(body["size"], 3);
    assert!(body["mtime"].is_string());
    assert!(body["birthtime"].is_string());
}

#[tokio::test]
async fn test_move_destination_outside_root_is_forbidden() {
    let (_dir, root, app) = setup_test_env();
    let outside = TempDir::new().unwrap();
    fs::write(root.join("keep.txt"), "x").unwrap();

    let request = json!({
        "source": path_str(&root.join("keep.txt")),
        "destination": path_str(&outside.path().join("stolen.txt")),
    });
    let (status, _) = post(&app, "/move_path", request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(root.join("keep.txt").exists());
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let (_dir, root, app) = setup_test_env();
    let target = root.join("dir");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("file.txt"), "x").unwrap();
    let target_str = path_str(&target);

    // Non-recursive delete of a non-empty directory
    let (status, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": false}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "DIRECTORY_NOT_EMPTY");

    // First call issues a token
    let (status, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert!(body["expires_at"].is_string());
    let token = body["confirmation_token"].as_str().unwrap().to_string();
    assert!(target.exists());

    // Second call with the token deletes
    let (status, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": true, "confirmationToken": token}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
    assert!(!target.exists());

    // Token is spent
    let (status, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": true, "confirmationToken": token}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_delete_with_mismatched_flag_invalidates_token() {
    let (_dir, root, app) = setup_test_env();
    let target = root.join("empty");
    fs::create_dir(&target).unwrap();
    let target_str = path_str(&target);

    let (_, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": true}),
    )
    .await;
    let token = body["confirmation_token"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": false, "confirmationToken": token}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "PARAMETER_MISMATCH");

    let (status, body) = post(
        &app,
        "/delete_path",
        json!({"path": target_str, "recursive": true, "confirmationToken": token}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_TOKEN");
    assert!(target.exists());
}

#[tokio::test]
async fn test_delete_missing_path_is_not_found() {
    let (_dir, root, app) = setup_test_env();
    let (status, _) = post(
        &app,
        "/delete_path",
        json!({"path": path_str(&root.join("ghost")), "recursive": false}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
