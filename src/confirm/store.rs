//! Module `store`
//!
//! Storage for pending delete confirmations. The broker only talks to the
//! [`ConfirmationStore`] trait, so the in-process map below can be swapped
//! for a shared TTL cache when running more than one instance.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// A delete request waiting for its confirmation round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    /// Resolved target of the delete
    pub path: PathBuf,
    pub recursive: bool,
    pub expires_at: DateTime<Utc>,
}

impl PendingConfirmation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Token-keyed storage for pending confirmations.
///
/// Implementations must make `take` atomic: a token can be taken at most once.
pub trait ConfirmationStore: Send + Sync {
    fn insert(&self, token: String, pending: PendingConfirmation);

    /// Remove and return the entry for `token`.
    fn take(&self, token: &str) -> Option<PendingConfirmation>;

    /// Drop every entry that expired before `now`; returns how many were dropped.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutex-guarded map, lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, PendingConfirmation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingConfirmation>> {
        // A panic while holding the lock leaves the map itself consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfirmationStore for InMemoryStore {
    fn insert(&self, token: String, pending: PendingConfirmation) {
        self.lock().insert(token, pending);
    }

    fn take(&self, token: &str) -> Option<PendingConfirmation> {
        self.lock().remove(token)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, pending| !pending.is_expired(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
