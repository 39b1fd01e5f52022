use std::sync::Arc;
use std::time::Duration;
use supportdesk_session::SessionManager;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Periodically purges expired sessions from the cache and the store.
///
/// The first purge runs one `interval` after spawning. Purge errors are
/// logged and the loop keeps going; abort the handle to stop it.
pub fn spawn_expiry_sweeper(sessions: Arc<SessionManager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "Expiry sweep finished"),
                Err(e) => warn!(error = %e, "Expiry sweep failed"),
            }
        }
    })
}
