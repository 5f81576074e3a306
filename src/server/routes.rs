//! HTTP router composition

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::log_request;
use crate::server::handlers;
use crate::server::state::SharedState;

/// One route per file operation
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Files
        .route("/read_file", post(handlers::read_file))
        .route("/write_file", post(handlers::write_file))
        .route("/edit_file", post(handlers::edit_file))
        .route("/get_metadata", post(handlers::get_metadata))
        // Directories
        .route("/create_directory", post(handlers::create_directory))
        .route("/list_directory", post(handlers::list_directory))
        .route("/directory_tree", post(handlers::directory_tree))
        .route("/list_allowed_directories", get(handlers::list_allowed_directories))
        // Search
        .route("/search_files", post(handlers::search_files))
        .route("/search_content", post(handlers::search_content))
        // Destructive
        .route("/move_path", post(handlers::move_path))
        .route("/delete_path", post(handlers::delete_path))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
