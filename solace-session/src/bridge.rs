//! Auto-unlock bridge.
//!
//! Immediately after an interactive sign-in the auth flow briefly holds the
//! plaintext password. Instead of leaving it reachable in a global, the
//! sign-in flow hands it to the bridge as a one-shot [`PendingCredential`];
//! the bridge consumes it on the next [`AutoUnlockBridge::try_unlock`] call
//! and attempts a single best-effort unlock so the user is not re-prompted.

use crate::{SessionLock, SessionResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// A transiently-held credential passed once from the sign-in flow.
///
/// The secret is zeroized when the credential is dropped, whether or not
/// the unlock attempt happened.
pub struct PendingCredential {
    identity: String,
    secret: Zeroizing<String>,
}

impl PendingCredential {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }
}

/// Best-effort automatic unlock after sign-in.
///
/// Holds at most one pending credential. Failure here only means the user
/// sees the manual unlock prompt; it never propagates as an error.
pub struct AutoUnlockBridge {
    session: Arc<SessionLock>,
    pending: Mutex<Option<PendingCredential>>,
}

impl AutoUnlockBridge {
    pub fn new(session: Arc<SessionLock>) -> Self {
        Self {
            session,
            pending: Mutex::new(None),
        }
    }

    /// Stores the credential from a sign-in event, replacing any previous
    /// one. A credential for a different identity than this session is
    /// discarded immediately.
    pub async fn offer(&self, credential: PendingCredential) {
        if credential.identity != self.session.identity() {
            warn!("auto-unlock: credential identity does not match session, discarding");
            return;
        }
        *self.pending.lock().await = Some(credential);
    }

    /// Consumes the pending credential (if any) and attempts one unlock.
    ///
    /// Returns whether the session is unlocked afterwards. Never retries:
    /// a wrong transient credential is dropped and the manual prompt takes
    /// over.
    pub async fn try_unlock(&self) -> bool {
        let credential = self.pending.lock().await.take();
        let Some(credential) = credential else {
            return self.session.is_unlocked().await;
        };

        if self.session.is_unlocked().await {
            debug!("auto-unlock: session already unlocked, discarding credential");
            return true;
        }

        match self.attempt(&credential).await {
            Ok(()) => {
                debug!("auto-unlock succeeded");
                true
            }
            Err(e) => {
                warn!("auto-unlock failed, falling back to manual prompt: {e}");
                false
            }
        }
    }

    async fn attempt(&self, credential: &PendingCredential) -> SessionResult<()> {
        self.session.unlock(credential.secret.as_str()).await
    }
}
