//! Record-shaped encryption for Solace.
//!
//! The facade between the application's record types (journal entries,
//! goals) and the envelope cipher. Each encrypt call generates exactly one
//! fresh data key, encrypts every present field with it, and wraps the data
//! key under the session master key; the backend only ever receives the
//! resulting ciphertext record. Decryption is all-or-nothing per record:
//! a record either yields all of its fields or a single
//! [`RecordError::DecryptionFailed`].

mod error;
mod goal;
mod journal;
mod service;

pub use error::{RecordError, RecordResult};
pub use goal::{decrypt_goal, encrypt_goal, EncryptedGoal, GoalDraft, GoalFields};
pub use journal::{
    decrypt_journal_entry, encrypt_journal_entry, word_count, EncryptedJournalEntry,
    JournalEntryDraft, JournalEntryFields,
};
pub use service::EncryptionService;

use solace_crypto::{decrypt_text, encrypt_text, CryptoResult, DataKey, EncryptedField};

/// Encrypts an optional field, mapping absence to the empty-pair convention
/// so every record of a family has the same shape.
fn encrypt_optional(text: Option<&str>, data_key: &DataKey) -> CryptoResult<EncryptedField> {
    match text {
        Some(text) => encrypt_text(text, data_key),
        None => Ok(EncryptedField::empty()),
    }
}

/// Decrypts an optional field, mapping the empty-pair convention back to
/// absence.
fn decrypt_optional(field: &EncryptedField, data_key: &DataKey) -> CryptoResult<Option<String>> {
    if field.is_empty() {
        return Ok(None);
    }
    decrypt_text(field, data_key).map(Some)
}
