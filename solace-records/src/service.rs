//! Application-facing encryption surface.
//!
//! The single object the rest of the product talks to: lock state for the
//! UI, unlock/lock actions, and record-shaped encrypt/decrypt. Routes
//! everything through one shared [`SessionLock`] so key ownership stays in
//! one place.

use crate::error::RecordResult;
use crate::goal::{decrypt_goal, encrypt_goal, EncryptedGoal, GoalDraft, GoalFields};
use crate::journal::{
    decrypt_journal_entry, encrypt_journal_entry, EncryptedJournalEntry, JournalEntryDraft,
    JournalEntryFields,
};
use solace_session::{
    AutoUnlockBridge, KeyCheck, SecurityPrefs, SessionLock, SessionResult,
};
use std::sync::Arc;

/// Encryption capability handle for one authenticated session.
///
/// Constructed at sign-in, dropped at sign-out.
pub struct EncryptionService {
    session: Arc<SessionLock>,
    bridge: AutoUnlockBridge,
}

impl EncryptionService {
    /// Creates the service for a signed-in user.
    pub fn new(identity: impl Into<String>, prefs: SecurityPrefs) -> Self {
        let session = Arc::new(SessionLock::new(identity, prefs));
        let bridge = AutoUnlockBridge::new(session.clone());
        Self { session, bridge }
    }

    /// Builds the service around an existing session (tests, custom KDF).
    pub fn with_session(session: Arc<SessionLock>) -> Self {
        let bridge = AutoUnlockBridge::new(session.clone());
        Self { session, bridge }
    }

    /// The underlying session lock, for collaborators that only need
    /// lock-state observation.
    pub fn session(&self) -> &Arc<SessionLock> {
        &self.session
    }

    /// The auto-unlock bridge fed by the sign-in flow.
    pub fn bridge(&self) -> &AutoUnlockBridge {
        &self.bridge
    }

    // ── Lock state surface ──

    pub async fn encryption_ready(&self) -> bool {
        self.session.encryption_ready().await
    }

    pub async fn probe_capability(&self) -> SessionResult<()> {
        self.session.probe_capability().await
    }

    pub async fn is_unlocked(&self) -> bool {
        self.session.is_unlocked().await
    }

    pub async fn needs_unlock_prompt(&self) -> bool {
        self.session.needs_unlock_prompt().await
    }

    pub async fn unlock_encryption(&self, password: &str) -> SessionResult<()> {
        self.session.unlock(password).await
    }

    pub async fn lock_encryption(&self) {
        self.session.lock().await
    }

    pub async fn install_key_check(&self, check: KeyCheck) {
        self.session.install_key_check(check).await
    }

    pub async fn key_check(&self) -> Option<KeyCheck> {
        self.session.key_check().await
    }

    pub async fn set_security_prefs(&self, prefs: SecurityPrefs) {
        self.session.set_prefs(prefs).await
    }

    // ── Record operations ──

    pub async fn encrypt_journal_entry(
        &self,
        draft: &JournalEntryDraft,
    ) -> RecordResult<EncryptedJournalEntry> {
        encrypt_journal_entry(&self.session, draft).await
    }

    pub async fn decrypt_journal_entry(
        &self,
        record: &EncryptedJournalEntry,
    ) -> RecordResult<JournalEntryFields> {
        decrypt_journal_entry(&self.session, record).await
    }

    pub async fn encrypt_goal(&self, draft: &GoalDraft) -> RecordResult<EncryptedGoal> {
        encrypt_goal(&self.session, draft).await
    }

    pub async fn decrypt_goal(&self, record: &EncryptedGoal) -> RecordResult<GoalFields> {
        decrypt_goal(&self.session, record).await
    }
}
