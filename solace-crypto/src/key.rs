//! Key types and derivation.
//!
//! The master key is derived from the user's credentials with Argon2id,
//! deliberately tuned to be slow. Data keys are random and short-lived:
//! they exist unwrapped only for the duration of one encrypt/decrypt call.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key size in bytes (ChaCha20-Poly1305).
pub const KEY_SIZE: usize = 32;

/// Argon2id salt size in bytes.
pub const SALT_SIZE: usize = 16;

/// The long-lived session key derived from user credentials.
///
/// Lives only in volatile memory while a session is unlocked. Deliberately
/// carries no serde derives: it must never be serialized or persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// A fresh per-record key. Exists unwrapped only transiently during an
/// encrypt/decrypt operation; persisted only in wrapped form.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl DataKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Argon2id salt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    /// Deterministic per-user salt from a stable identity (e.g. email).
    ///
    /// Domain-separated SHA-256, truncated to `SALT_SIZE`. Determinism is
    /// required so the same (identity, password) pair always derives the
    /// same master key across sessions and devices.
    pub fn from_identity(identity: &str) -> Self {
        let digest = Sha256::digest(format!("solace-identity-salt-v1:{identity}"));
        let mut bytes = [0u8; SALT_SIZE];
        bytes.copy_from_slice(&digest[..SALT_SIZE]);
        Self(bytes)
    }
}

/// Argon2id cost parameters.
#[derive(Clone, Debug)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // 64 MiB, 3 passes: slow enough to resist offline brute force on
        // consumer hardware without stalling unlock for multiple seconds.
        Self {
            m_cost: 64 * 1024,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

/// Derives a 256-bit key from a secret and salt using Argon2id.
///
/// Deterministic: the same inputs always yield the same key.
pub fn derive_key(secret: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<MasterKey> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_SIZE))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(secret.as_bytes(), salt.as_bytes(), &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let key = MasterKey::from_bytes(out);
    out.zeroize();
    Ok(key)
}

/// Derives the session master key from a stable identity and password.
pub fn derive_master_key(
    identity: &str,
    secret: &str,
    params: &KdfParams,
) -> CryptoResult<MasterKey> {
    derive_key(secret, &Salt::from_identity(identity), params)
}

/// Generates a fresh random data key from the OS entropy source.
///
/// Fails with `UnsupportedPlatform` if the secure random source is
/// unavailable; callers must disable encryption rather than degrade.
pub fn generate_data_key() -> CryptoResult<DataKey> {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| CryptoError::UnsupportedPlatform)?;
    let key = DataKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams {
            m_cost: 8,
            t_cost: 1,
            p_cost: 1,
        }
    }

    #[test]
    fn derive_is_deterministic() {
        let salt = Salt::from_identity("user@example.com");
        let k1 = derive_key("hunter22", &salt, &fast_params()).unwrap();
        let k2 = derive_key("hunter22", &salt, &fast_params()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_passwords_differ() {
        let salt = Salt::from_identity("user@example.com");
        let k1 = derive_key("hunter22", &salt, &fast_params()).unwrap();
        let k2 = derive_key("hunter23", &salt, &fast_params()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_identities_differ() {
        let k1 = derive_key("hunter22", &Salt::from_identity("a@example.com"), &fast_params())
            .unwrap();
        let k2 = derive_key("hunter22", &Salt::from_identity("b@example.com"), &fast_params())
            .unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn identity_salt_is_stable() {
        assert_eq!(
            Salt::from_identity("user@example.com"),
            Salt::from_identity("user@example.com")
        );
        assert_ne!(
            Salt::from_identity("user@example.com"),
            Salt::from_identity("other@example.com")
        );
    }

    #[test]
    fn random_data_keys_are_distinct() {
        let k1 = generate_data_key().unwrap();
        let k2 = generate_data_key().unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }
}
