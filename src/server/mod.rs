//! Server core functionality
//!
//! This module contains the HTTP server, its routes and handlers,
//! and the state shared between requests.

pub mod core;
pub mod handlers;
pub mod requests;
pub mod routes;
pub mod state;

pub use self::core::Server;
pub use routes::build_router;
pub use state::{AppState, SharedState};
