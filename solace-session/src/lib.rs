//! Session lock controller for the Solace encryption layer.
//!
//! One `SessionLock` exists per authenticated session. It is the only
//! owner of the master key: the key is derived on unlock, held in volatile
//! memory while the session is `Unlocked`, and dropped (zeroized) on any
//! transition away from `Unlocked`. Everything else in the application
//! borrows the key one operation at a time through [`SessionLock::master_key`].
//!
//! Unlock attempts are serialized through an internal gate so a manual
//! unlock racing the auto-unlock bridge observes the first attempt's result
//! instead of deriving a second key. An inactivity timer locks the session
//! after the user-configured idle timeout.

mod bridge;
mod config;
mod error;

pub use bridge::{AutoUnlockBridge, PendingCredential};
pub use config::{AutoLockTimeout, SecurityPrefs};
pub use error::{SessionError, SessionResult};

use serde::{Deserialize, Serialize};
use solace_crypto::{
    decrypt, derive_master_key, encrypt, generate_data_key, CryptoError, EncryptedData, KdfParams,
    MasterKey,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Known plaintext encrypted under the master key on first unlock.
/// Subsequent unlocks must decrypt it or the password is wrong.
const KEY_CHECK_PLAINTEXT: &[u8] = b"solace-key-check-v1";

/// How often the auto-lock task re-reads preferences while no finite
/// timeout is configured.
const AUTO_LOCK_RECHECK: Duration = Duration::from_secs(30);

/// Lock state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    /// No master key in memory. All encrypt/decrypt operations fail.
    Locked,
    /// A key derivation is in flight.
    Unlocking,
    /// Master key held in memory.
    Unlocked,
}

/// Result of the platform capability probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Capability {
    Unknown,
    Ready,
    Unsupported,
}

/// Persisted known-ciphertext check for password verification.
///
/// Contains no key material: only a fixed plaintext encrypted under the
/// master key. Safe to store next to the user's records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyCheck(EncryptedData);

impl KeyCheck {
    fn create(master: &MasterKey) -> Result<Self, CryptoError> {
        Ok(Self(encrypt(master.as_bytes(), KEY_CHECK_PLAINTEXT)?))
    }

    fn verify(&self, master: &MasterKey) -> bool {
        matches!(decrypt(master.as_bytes(), &self.0), Ok(p) if p == KEY_CHECK_PLAINTEXT)
    }
}

struct SessionState {
    phase: LockState,
    master: Option<MasterKey>,
    /// UI convenience flag only; never a substitute for holding the key.
    unlocked_this_session: bool,
    /// Bumped on every transition; stale auto-lock timers and interrupted
    /// unlock attempts check it before touching the state.
    generation: u64,
}

/// The session lock controller.
///
/// Constructed at sign-in, dropped at sign-out. Cheap to clone via the
/// shared handles inside; typically held as `Arc<SessionLock>`.
pub struct SessionLock {
    identity: String,
    kdf: KdfParams,
    state: Arc<RwLock<SessionState>>,
    unlock_gate: Mutex<()>,
    capability: Arc<RwLock<Capability>>,
    key_check: Arc<RwLock<Option<KeyCheck>>>,
    prefs: Arc<RwLock<SecurityPrefs>>,
    last_activity: Arc<RwLock<Instant>>,
}

impl SessionLock {
    /// Creates a locked session for the given stable user identity.
    pub fn new(identity: impl Into<String>, prefs: SecurityPrefs) -> Self {
        Self::with_kdf_params(identity, prefs, KdfParams::default())
    }

    /// Creates a session with explicit KDF cost parameters.
    pub fn with_kdf_params(
        identity: impl Into<String>,
        prefs: SecurityPrefs,
        kdf: KdfParams,
    ) -> Self {
        Self {
            identity: identity.into(),
            kdf,
            state: Arc::new(RwLock::new(SessionState {
                phase: LockState::Locked,
                master: None,
                unlocked_this_session: false,
                generation: 0,
            })),
            unlock_gate: Mutex::new(()),
            capability: Arc::new(RwLock::new(Capability::Unknown)),
            key_check: Arc::new(RwLock::new(None)),
            prefs: Arc::new(RwLock::new(prefs)),
            last_activity: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// The stable identity this session belongs to.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Runs the platform capability self-test: random key generation plus
    /// one authenticated round trip. Idempotent; `unlock` fails with
    /// `NotReady` until this has completed.
    pub async fn probe_capability(&self) -> SessionResult<()> {
        {
            let cap = self.capability.read().await;
            match *cap {
                Capability::Ready => return Ok(()),
                Capability::Unsupported => return Err(SessionError::Unsupported),
                Capability::Unknown => {}
            }
        }

        let outcome = generate_data_key().and_then(|key| {
            let enc = encrypt(key.as_bytes(), b"capability-probe")?;
            decrypt(key.as_bytes(), &enc)
        });

        let mut cap = self.capability.write().await;
        match outcome {
            Ok(_) => {
                *cap = Capability::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("encryption capability probe failed: {e}");
                *cap = Capability::Unsupported;
                Err(SessionError::Unsupported)
            }
        }
    }

    /// Whether the capability probe has completed successfully.
    pub async fn encryption_ready(&self) -> bool {
        *self.capability.read().await == Capability::Ready
    }

    /// Installs a persisted key check restored from the backend.
    pub async fn install_key_check(&self, check: KeyCheck) {
        *self.key_check.write().await = Some(check);
    }

    /// The current key check, for persistence after a first unlock.
    pub async fn key_check(&self) -> Option<KeyCheck> {
        self.key_check.read().await.clone()
    }

    /// Unlocks the session by deriving the master key from the password.
    ///
    /// Serialized: concurrent callers wait on the gate and observe the
    /// first caller's result instead of re-deriving. Idempotent while
    /// already unlocked. The KDF runs on the blocking pool so the caller's
    /// event loop is never stalled by the deliberately slow derivation.
    pub async fn unlock(&self, password: &str) -> SessionResult<()> {
        let _gate = self.unlock_gate.lock().await;

        match *self.capability.read().await {
            Capability::Unknown => return Err(SessionError::NotReady),
            Capability::Unsupported => return Err(SessionError::Unsupported),
            Capability::Ready => {}
        }

        {
            let state = self.state.read().await;
            if state.phase == LockState::Unlocked {
                debug!("unlock: already unlocked, nothing to do");
                return Ok(());
            }
        }

        {
            let mut state = self.state.write().await;
            state.phase = LockState::Unlocking;
        }

        let identity = self.identity.clone();
        let secret = Zeroizing::new(password.to_owned());
        let kdf = self.kdf.clone();
        let derived =
            tokio::task::spawn_blocking(move || derive_master_key(&identity, secret.as_str(), &kdf))
                .await
                .map_err(|e| {
                    SessionError::Crypto(CryptoError::KeyDerivation(format!(
                        "derivation task failed: {e}"
                    )))
                });

        let master = match derived.and_then(|r| r.map_err(SessionError::from)) {
            Ok(key) => key,
            Err(e) => {
                self.revert_to_locked().await;
                return Err(e);
            }
        };

        // Verify against the known ciphertext, or create it on first unlock.
        let existing = self.key_check.read().await.clone();
        match existing {
            Some(check) => {
                if !check.verify(&master) {
                    warn!("unlock rejected: derived key failed the key check");
                    self.revert_to_locked().await;
                    return Err(SessionError::IncorrectPassword);
                }
            }
            None => match KeyCheck::create(&master) {
                Ok(check) => *self.key_check.write().await = Some(check),
                Err(e) => {
                    self.revert_to_locked().await;
                    return Err(e.into());
                }
            },
        }

        let generation = {
            let mut state = self.state.write().await;
            if state.phase != LockState::Unlocking {
                // Locked (e.g. sign-out) while the derivation was in flight.
                debug!("unlock: session was locked mid-derivation, discarding key");
                return Err(SessionError::Locked);
            }
            state.phase = LockState::Unlocked;
            state.master = Some(master);
            state.unlocked_this_session = true;
            state.generation += 1;
            state.generation
        };

        *self.last_activity.write().await = Instant::now();
        self.spawn_auto_lock(generation);
        debug!("session unlocked");
        Ok(())
    }

    /// Locks the session: drops the master key and clears the session flag.
    /// Always succeeds. In-flight operations that already borrowed the key
    /// finish on their own; no new operation can start.
    pub async fn lock(&self) {
        let mut state = self.state.write().await;
        state.master = None;
        state.phase = LockState::Locked;
        state.unlocked_this_session = false;
        state.generation += 1;
        debug!("session locked");
    }

    /// Current lock state.
    pub async fn state(&self) -> LockState {
        self.state.read().await.phase
    }

    pub async fn is_unlocked(&self) -> bool {
        self.state.read().await.phase == LockState::Unlocked
    }

    /// UI-only flag: the session has been unlocked at least once and is
    /// still unlocked. Cleared whenever the key is cleared.
    pub async fn unlocked_this_session(&self) -> bool {
        self.state.read().await.unlocked_this_session
    }

    /// Whether the UI should show the manual unlock prompt.
    pub async fn needs_unlock_prompt(&self) -> bool {
        self.encryption_ready().await && !self.is_unlocked().await
    }

    /// Borrows the master key for one operation, or fails with `Locked`.
    /// Counts as user activity for the inactivity timer.
    pub async fn master_key(&self) -> SessionResult<MasterKey> {
        let key = {
            let state = self.state.read().await;
            state.master.clone().ok_or(SessionError::Locked)?
        };
        self.record_activity().await;
        Ok(key)
    }

    /// Resets the inactivity clock.
    pub async fn record_activity(&self) {
        *self.last_activity.write().await = Instant::now();
    }

    /// Replaces the security preferences. The running auto-lock timer
    /// picks up the change on its next wake.
    pub async fn set_prefs(&self, prefs: SecurityPrefs) {
        *self.prefs.write().await = prefs;
    }

    pub async fn prefs(&self) -> SecurityPrefs {
        *self.prefs.read().await
    }

    async fn revert_to_locked(&self) {
        let mut state = self.state.write().await;
        if state.phase == LockState::Unlocking {
            state.phase = LockState::Locked;
        }
    }

    fn spawn_auto_lock(&self, generation: u64) {
        let state = self.state.clone();
        let prefs = self.prefs.clone();
        let last_activity = self.last_activity.clone();

        tokio::spawn(async move {
            loop {
                let timeout = {
                    let p = prefs.read().await;
                    if p.auto_lock_enabled {
                        p.auto_lock.as_duration()
                    } else {
                        None
                    }
                };

                let Some(timeout) = timeout else {
                    // No finite timeout right now; keep watching prefs.
                    tokio::time::sleep(AUTO_LOCK_RECHECK).await;
                    if state.read().await.generation != generation {
                        return;
                    }
                    continue;
                };

                let idle = last_activity.read().await.elapsed();
                if idle >= timeout {
                    let mut s = state.write().await;
                    if s.generation != generation {
                        return;
                    }
                    debug!("auto-lock after {:?} idle", idle);
                    s.master = None;
                    s.phase = LockState::Locked;
                    s.unlocked_this_session = false;
                    s.generation += 1;
                    return;
                }

                tokio::time::sleep(timeout - idle).await;
                if state.read().await.generation != generation {
                    return;
                }
            }
        });
    }
}
