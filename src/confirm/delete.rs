//! Module `delete`
//!
//! Two-step delete: the first call issues a confirmation token, the second
//! call redeems it and performs the removal.

use log::info;
use std::path::Path;

use crate::confirm::broker::ConfirmationBroker;
use crate::error::FsResult;
use crate::storage::operations::{check_deletable, remove_path};
use crate::storage::results::DeleteOutcome;

/// Delete `path`, or issue a confirmation token when `token` is absent.
///
/// A redeemed token is spent whatever the outcome, except when the removal
/// fails on permissions: then it is kept so the caller can retry before it
/// expires.
pub fn delete_path(
    broker: &ConfirmationBroker,
    path: &Path,
    recursive: bool,
    token: Option<&str>,
) -> FsResult<DeleteOutcome> {
    let Some(token) = token else {
        // Refuse early rather than issue a token that can never succeed
        check_deletable(path, recursive)?;
        let issued = broker.request(path, recursive)?;
        return Ok(DeleteOutcome::Pending {
            token: issued.token,
            expires_at: issued.expires_at,
        });
    };

    let pending = broker.confirm(token, path, recursive)?;

    let removal = check_deletable(path, recursive).and_then(|_| remove_path(path, recursive));
    match removal {
        Ok(()) => {
            info!("Confirmed delete of {} completed", path.display());
            Ok(DeleteOutcome::Deleted {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            if e.is_permission_denied() {
                broker.reinstate(token, pending);
            }
            Err(e)
        }
    }
}
