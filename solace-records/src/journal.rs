//! Journal entry encryption.

use crate::error::{RecordError, RecordResult};
use crate::{decrypt_optional, encrypt_optional};
use serde::{Deserialize, Serialize};
use solace_crypto::{decrypt_text, encrypt_text, generate_data_key, unwrap_key, wrap_key};
use solace_session::SessionLock;
use tracing::debug;

/// Plaintext journal entry as composed by the user.
#[derive(Clone, Debug)]
pub struct JournalEntryDraft {
    pub content: String,
    pub html_content: Option<String>,
    pub prompt: Option<String>,
}

/// Plaintext fields recovered from an encrypted entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntryFields {
    pub content: String,
    pub html_content: Option<String>,
    pub prompt: Option<String>,
}

/// A journal entry as persisted: every sensitive field is ciphertext, the
/// per-record data key is stored only wrapped under the master key, and
/// `word_count` is derived plaintext metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedJournalEntry {
    pub encrypted_content: String,
    pub content_iv: String,
    pub encrypted_html_content: String,
    pub html_content_iv: String,
    pub encrypted_prompt: String,
    pub prompt_iv: String,
    pub encrypted_data_key: String,
    pub data_key_iv: String,
    pub word_count: u32,
}

/// Whitespace-delimited word count of the plaintext content.
///
/// Computed at encrypt time because it is not recoverable from ciphertext.
pub fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Encrypts a journal entry under a fresh data key.
///
/// Requires an unlocked session. The data key is generated first, every
/// present field is encrypted with it, and only then is the key wrapped
/// under the master key; the record is returned fully formed or not at all.
pub async fn encrypt_journal_entry(
    session: &SessionLock,
    draft: &JournalEntryDraft,
) -> RecordResult<EncryptedJournalEntry> {
    let master = session.master_key().await?;

    let data_key = generate_data_key().map_err(|e| RecordError::Crypto(e.to_string()))?;

    let content = encrypt_text(&draft.content, &data_key)
        .map_err(|e| RecordError::Crypto(e.to_string()))?;
    let html_content = encrypt_optional(draft.html_content.as_deref(), &data_key)
        .map_err(|e| RecordError::Crypto(e.to_string()))?;
    let prompt = encrypt_optional(draft.prompt.as_deref(), &data_key)
        .map_err(|e| RecordError::Crypto(e.to_string()))?;

    let wrapped = wrap_key(&data_key, &master).map_err(|e| RecordError::Crypto(e.to_string()))?;

    Ok(EncryptedJournalEntry {
        encrypted_content: content.ciphertext,
        content_iv: content.iv,
        encrypted_html_content: html_content.ciphertext,
        html_content_iv: html_content.iv,
        encrypted_prompt: prompt.ciphertext,
        prompt_iv: prompt.iv,
        encrypted_data_key: wrapped.ciphertext,
        data_key_iv: wrapped.iv,
        word_count: word_count(&draft.content),
    })
}

/// Decrypts a journal entry.
///
/// All-or-nothing: if the key unwrap or any single field fails, the whole
/// record fails with `DecryptionFailed` and no partial plaintext escapes.
pub async fn decrypt_journal_entry(
    session: &SessionLock,
    record: &EncryptedJournalEntry,
) -> RecordResult<JournalEntryFields> {
    let master = session.master_key().await?;

    let result = (|| {
        let data_key = unwrap_key(&record.wrapped_data_key(), &master)?;
        let content = decrypt_text(&record.content_field(), &data_key)?;
        let html_content = decrypt_optional(&record.html_content_field(), &data_key)?;
        let prompt = decrypt_optional(&record.prompt_field(), &data_key)?;
        Ok::<_, solace_crypto::CryptoError>(JournalEntryFields {
            content,
            html_content,
            prompt,
        })
    })();

    result.map_err(|e| {
        debug!("journal entry decryption failed: {e}");
        RecordError::DecryptionFailed
    })
}

impl EncryptedJournalEntry {
    fn content_field(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_content.clone(),
            iv: self.content_iv.clone(),
        }
    }

    fn html_content_field(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_html_content.clone(),
            iv: self.html_content_iv.clone(),
        }
    }

    fn prompt_field(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_prompt.clone(),
            iv: self.prompt_iv.clone(),
        }
    }

    fn wrapped_data_key(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_data_key.clone(),
            iv: self.data_key_iv.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count("Hello"), 1);
        assert_eq!(word_count("two  words"), 2);
        assert_eq!(word_count("  leading and trailing  "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("line\nbreaks\tand tabs"), 4);
    }
}
