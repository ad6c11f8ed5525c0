//! Envelope cipher: text and key wrapping on top of the AEAD primitives.
//!
//! Translates between "text + key" and the persisted `(ciphertext, iv)`
//! pair, and between "key + key" and a wrapped data key the same way.
//! Has no knowledge of record shapes; the record facade composes these
//! operations per field family.

use crate::cipher::{self, EncryptedData, NONCE_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{DataKey, MasterKey, KEY_SIZE};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// One encrypted field as it is persisted: base64 ciphertext + base64 iv.
///
/// Absent optional fields are stored as empty pairs rather than omitted,
/// so every record of a family has the same shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    pub ciphertext: String,
    pub iv: String,
}

impl EncryptedField {
    /// The empty-pair convention for an absent optional field.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty() && self.iv.is_empty()
    }

    fn from_data(data: EncryptedData) -> Self {
        Self {
            ciphertext: BASE64.encode(&data.ciphertext),
            iv: BASE64.encode(data.nonce),
        }
    }

    fn to_data(&self) -> CryptoResult<EncryptedData> {
        let ciphertext = BASE64
            .decode(&self.ciphertext)
            .map_err(|e| CryptoError::Encoding(format!("invalid ciphertext base64: {e}")))?;
        let iv = BASE64
            .decode(&self.iv)
            .map_err(|e| CryptoError::Encoding(format!("invalid iv base64: {e}")))?;

        if iv.len() != NONCE_SIZE {
            return Err(CryptoError::Encoding(format!(
                "invalid iv length: expected {NONCE_SIZE}, got {}",
                iv.len()
            )));
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&iv);

        Ok(EncryptedData { nonce, ciphertext })
    }
}

/// Encrypts one text field under a record's data key.
pub fn encrypt_text(text: &str, data_key: &DataKey) -> CryptoResult<EncryptedField> {
    let data = cipher::encrypt(data_key.as_bytes(), text.as_bytes())?;
    Ok(EncryptedField::from_data(data))
}

/// Decrypts one text field under a record's data key.
pub fn decrypt_text(field: &EncryptedField, data_key: &DataKey) -> CryptoResult<String> {
    let plaintext = cipher::decrypt(data_key.as_bytes(), &field.to_data()?)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Encoding(format!("decrypted field is not UTF-8: {e}")))
}

/// Wraps (encrypts) a data key under the session master key.
pub fn wrap_key(data_key: &DataKey, master_key: &MasterKey) -> CryptoResult<EncryptedField> {
    let data = cipher::encrypt(master_key.as_bytes(), data_key.as_bytes())?;
    Ok(EncryptedField::from_data(data))
}

/// Unwraps (decrypts) a data key under the session master key.
pub fn unwrap_key(wrapped: &EncryptedField, master_key: &MasterKey) -> CryptoResult<DataKey> {
    let key_bytes = cipher::decrypt(master_key.as_bytes(), &wrapped.to_data()?)?;

    if key_bytes.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key_bytes.len(),
        });
    }

    let mut arr = [0u8; KEY_SIZE];
    arr.copy_from_slice(&key_bytes);
    Ok(DataKey::from_bytes(arr))
}
