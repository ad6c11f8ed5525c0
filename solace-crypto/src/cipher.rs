//! Authenticated encryption primitives (ChaCha20-Poly1305).

use crate::error::{CryptoError, CryptoResult};
use crate::key::KEY_SIZE;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};

/// ChaCha20-Poly1305 nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Ciphertext plus the nonce it was produced under.
///
/// The Poly1305 tag is appended to the ciphertext by the AEAD construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedData {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Total encrypted size in bytes.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

/// Encrypts plaintext under the given key with a fresh random nonce.
///
/// A new nonce is drawn from the OS entropy source on every call; identical
/// plaintexts never produce identical ciphertexts.
pub fn encrypt(key_bytes: &[u8; KEY_SIZE], plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| CryptoError::UnsupportedPlatform)?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key_bytes));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(EncryptedData { nonce, ciphertext })
}

/// Decrypts and authenticates.
///
/// Fails with `AuthenticationFailed` on a wrong key, tampered ciphertext,
/// or tampered nonce; never returns unauthenticated bytes.
pub fn decrypt(key_bytes: &[u8; KEY_SIZE], data: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key_bytes));
    cipher
        .decrypt(Nonce::from_slice(&data.nonce), data.ciphertext.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::generate_data_key;

    #[test]
    fn roundtrip() {
        let key = generate_data_key().unwrap();
        let enc = encrypt(key.as_bytes(), b"journal entry text").unwrap();
        let dec = decrypt(key.as_bytes(), &enc).unwrap();
        assert_eq!(dec, b"journal entry text");
    }

    #[test]
    fn fresh_nonce_per_call() {
        let key = generate_data_key().unwrap();
        let a = encrypt(key.as_bytes(), b"same").unwrap();
        let b = encrypt(key.as_bytes(), b"same").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_fails() {
        let key = generate_data_key().unwrap();
        let other = generate_data_key().unwrap();
        let enc = encrypt(key.as_bytes(), b"secret").unwrap();
        assert!(matches!(
            decrypt(other.as_bytes(), &enc),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = generate_data_key().unwrap();
        let mut enc = encrypt(key.as_bytes(), b"secret").unwrap();
        enc.ciphertext[0] ^= 0xFF;
        assert!(decrypt(key.as_bytes(), &enc).is_err());
    }

    #[test]
    fn tampered_nonce_fails() {
        let key = generate_data_key().unwrap();
        let mut enc = encrypt(key.as_bytes(), b"secret").unwrap();
        enc.nonce[0] ^= 0xFF;
        assert!(decrypt(key.as_bytes(), &enc).is_err());
    }

    #[test]
    fn ciphertext_carries_tag_overhead() {
        let key = generate_data_key().unwrap();
        let enc = encrypt(key.as_bytes(), b"1234").unwrap();
        assert_eq!(enc.ciphertext.len(), 4 + TAG_SIZE);
    }
}
