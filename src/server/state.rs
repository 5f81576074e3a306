//! Shared application state
//!
//! Everything a request handler needs: the path guard and the
//! confirmation broker.

use std::sync::Arc;

use crate::confirm::ConfirmationBroker;
use crate::storage::validation::{AllowedRoots, PathGuard};

pub struct AppState {
    pub guard: PathGuard,
    pub broker: ConfirmationBroker,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(guard: PathGuard, broker: ConfirmationBroker) -> Self {
        Self { guard, broker }
    }

    /// State with an in-memory confirmation table
    pub fn with_roots(roots: AllowedRoots) -> SharedState {
        Arc::new(Self::new(
            PathGuard::new(roots),
            ConfirmationBroker::in_memory(),
        ))
    }
}
