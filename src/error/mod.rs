//! Error handling
//!
//! Defines error types and their HTTP rendering for the filesystem server.

pub mod handlers;
pub mod types;

pub use types::*;
