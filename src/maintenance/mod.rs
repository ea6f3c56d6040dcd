use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::{AppState, sessions};

/// Blobs younger than this may belong to an upload whose metadata row is not written yet.
const ORPHAN_GRACE: Duration = Duration::from_secs(60 * 60);

/// Periodically drops expired sessions so the table does not grow without bound, and clears
/// upload blobs that never got a metadata row.
pub fn spawn(state: AppState) {
    tokio::spawn(async move {
        let interval = state.config().session_cleanup_interval;
        loop {
            match sessions::purge_expired(state.pool_ref()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "purged expired sessions"),
                Err(err) => error!(?err, "session cleanup cycle failed"),
            }
            if let Err(err) = state.files().sweep_orphans(ORPHAN_GRACE).await {
                error!(?err, "orphaned upload sweep failed");
            }
            sleep(interval).await;
        }
    });
}
