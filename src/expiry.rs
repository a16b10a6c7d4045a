use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{backend::BackendState, gate::SessionState};

/// ExpiryWatcher
///
/// A cancellable periodic task that keeps a shared session-state cell honest
/// about credential expiry. Once the authenticated session's `expires_at` has
/// passed, the watcher flips the cell to `Unauthenticated`, asks the session
/// provider to invalidate the session, and stops.
///
/// The task is owned by the value that started it: dropping the watcher
/// aborts the task, so a torn-down owner cannot leak a timer or fire a stale
/// sign-out afterwards.
pub struct ExpiryWatcher {
    handle: JoinHandle<()>,
}

impl ExpiryWatcher {
    /// spawn
    ///
    /// Starts the periodic check. `sessions` is the shared cell the owner
    /// reads its session state from; `token` is the credential to invalidate
    /// on expiry. The cadence is chosen by the owner; a minute is plenty for
    /// session horizons measured in hours.
    pub fn spawn(
        sessions: watch::Sender<SessionState>,
        token: String,
        backend: BackendState,
        every: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let expired = matches!(
                    &*sessions.borrow(),
                    SessionState::Authenticated { expires_at, .. }
                        if chrono::Utc::now().timestamp_millis() >= *expires_at
                );

                if expired {
                    sessions.send_replace(SessionState::Unauthenticated);
                    if let Err(e) = backend.sign_out(&token).await {
                        // The local state is already flipped; the provider
                        // will reject the stale token on its own anyway.
                        tracing::warn!("sign-out after expiry failed: {}", e);
                    }
                    break;
                }

                // Nothing left to watch once the owner signed out elsewhere.
                if matches!(&*sessions.borrow(), SessionState::Unauthenticated) {
                    break;
                }
            }
        });

        Self { handle }
    }

    /// True once the watcher's task has run to completion or been aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ExpiryWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
