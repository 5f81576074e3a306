//! Delete confirmation
//!
//! Short-lived, single-use tokens gating destructive operations.

pub mod broker;
pub mod delete;
pub mod store;

pub use broker::{CONFIRMATION_TTL_SECS, ConfirmationBroker, IssuedToken};
pub use delete::delete_path;
pub use store::{ConfirmationStore, InMemoryStore, PendingConfirmation};
