//! Goal record encryption.
//!
//! Same envelope pattern as journal entries with the goal field family.

use crate::error::{RecordError, RecordResult};
use crate::{decrypt_optional, encrypt_optional};
use serde::{Deserialize, Serialize};
use solace_crypto::{decrypt_text, encrypt_text, generate_data_key, unwrap_key, wrap_key};
use solace_session::SessionLock;
use tracing::debug;

/// Plaintext goal as composed by the user.
#[derive(Clone, Debug)]
pub struct GoalDraft {
    pub goal: String,
    pub description: Option<String>,
}

/// Plaintext fields recovered from an encrypted goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalFields {
    pub goal: String,
    pub description: Option<String>,
}

/// A goal record as persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedGoal {
    pub encrypted_goal: String,
    pub goal_iv: String,
    pub encrypted_description: String,
    pub description_iv: String,
    pub encrypted_data_key: String,
    pub data_key_iv: String,
}

/// Encrypts a goal under a fresh data key. Requires an unlocked session.
pub async fn encrypt_goal(session: &SessionLock, draft: &GoalDraft) -> RecordResult<EncryptedGoal> {
    let master = session.master_key().await?;

    let data_key = generate_data_key().map_err(|e| RecordError::Crypto(e.to_string()))?;

    let goal =
        encrypt_text(&draft.goal, &data_key).map_err(|e| RecordError::Crypto(e.to_string()))?;
    let description = encrypt_optional(draft.description.as_deref(), &data_key)
        .map_err(|e| RecordError::Crypto(e.to_string()))?;

    let wrapped = wrap_key(&data_key, &master).map_err(|e| RecordError::Crypto(e.to_string()))?;

    Ok(EncryptedGoal {
        encrypted_goal: goal.ciphertext,
        goal_iv: goal.iv,
        encrypted_description: description.ciphertext,
        description_iv: description.iv,
        encrypted_data_key: wrapped.ciphertext,
        data_key_iv: wrapped.iv,
    })
}

/// Decrypts a goal record. All-or-nothing per record.
pub async fn decrypt_goal(session: &SessionLock, record: &EncryptedGoal) -> RecordResult<GoalFields> {
    let master = session.master_key().await?;

    let result = (|| {
        let data_key = unwrap_key(&record.wrapped_data_key(), &master)?;
        let goal = decrypt_text(&record.goal_field(), &data_key)?;
        let description = decrypt_optional(&record.description_field(), &data_key)?;
        Ok::<_, solace_crypto::CryptoError>(GoalFields { goal, description })
    })();

    result.map_err(|e| {
        debug!("goal decryption failed: {e}");
        RecordError::DecryptionFailed
    })
}

impl EncryptedGoal {
    fn goal_field(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_goal.clone(),
            iv: self.goal_iv.clone(),
        }
    }

    fn description_field(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_description.clone(),
            iv: self.description_iv.clone(),
        }
    }

    fn wrapped_data_key(&self) -> solace_crypto::EncryptedField {
        solace_crypto::EncryptedField {
            ciphertext: self.encrypted_data_key.clone(),
            iv: self.data_key_iv.clone(),
        }
    }
}
