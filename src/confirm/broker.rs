//! Module `broker`
//!
//! Issues and validates the single-use tokens that gate deletes.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::confirm::store::{ConfirmationStore, InMemoryStore, PendingConfirmation};
use crate::error::{FsError, FsResult};
use crate::storage::filesystem::path_exists;

/// Lifetime of a confirmation token; never renewed
pub const CONFIRMATION_TTL_SECS: i64 = 120;

/// Token issued for a pending delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Lease manager for delete confirmations.
pub struct ConfirmationBroker {
    store: Arc<dyn ConfirmationStore>,
    ttl: Duration,
}

impl ConfirmationBroker {
    pub fn new(store: Arc<dyn ConfirmationStore>) -> Self {
        Self {
            store,
            ttl: Duration::seconds(CONFIRMATION_TTL_SECS),
        }
    }

    /// Broker backed by a process-local map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Number of confirmations currently pending
    pub fn pending_count(&self) -> usize {
        self.store.len()
    }

    /// Issue a token for deleting `path`.
    pub fn request(&self, path: &Path, recursive: bool) -> FsResult<IssuedToken> {
        if !path_exists(path) {
            return Err(FsError::NotFound(path.display().to_string()));
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.ttl;

        self.store.insert(
            token.clone(),
            PendingConfirmation {
                path: path.to_path_buf(),
                recursive,
                expires_at,
            },
        );

        info!(
            "Issued delete confirmation for {} (recursive: {}), expires {}",
            path.display(),
            recursive,
            expires_at.to_rfc3339()
        );
        Ok(IssuedToken { token, expires_at })
    }

    /// Redeem `token` for a delete of `path` with the given flag.
    ///
    /// The entry is removed before any check, so an expired or mismatched
    /// token is gone afterwards and a concurrent redeem sees `InvalidToken`.
    pub fn confirm(&self, token: &str, path: &Path, recursive: bool) -> FsResult<PendingConfirmation> {
        let Some(pending) = self.store.take(token) else {
            warn!("Rejected unknown confirmation token");
            return Err(FsError::InvalidToken);
        };

        if pending.is_expired(Utc::now()) {
            warn!("Rejected expired confirmation for {}", pending.path.display());
            return Err(FsError::Expired);
        }

        if pending.path != path || pending.recursive != recursive {
            warn!(
                "Rejected confirmation issued for {} (recursive: {}) used for {} (recursive: {})",
                pending.path.display(),
                pending.recursive,
                path.display(),
                recursive
            );
            return Err(FsError::ParameterMismatch);
        }

        debug!("Confirmation accepted for {}", path.display());
        Ok(pending)
    }

    /// Put a redeemed entry back, keeping its original expiry.
    ///
    /// Used when the delete failed on permissions so the caller can retry.
    pub fn reinstate(&self, token: &str, pending: PendingConfirmation) {
        if pending.is_expired(Utc::now()) {
            return;
        }
        info!(
            "Keeping confirmation for {} after permission failure",
            pending.path.display()
        );
        self.store.insert(token.to_string(), pending);
    }

    /// Evict expired entries
    pub fn sweep(&self) -> usize {
        let purged = self.store.purge_expired(Utc::now());
        if purged > 0 {
            debug!("Evicted {purged} expired confirmation(s)");
        }
        purged
    }
}
