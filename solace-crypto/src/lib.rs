//! Envelope-encryption layer for Solace.
//!
//! Protects journal entries and goal records before they leave the device:
//! - Argon2id for master-key derivation from the user's credentials
//! - ChaCha20-Poly1305 for authenticated encryption
//! - Secure key management with zeroization
//!
//! # Architecture
//!
//! The encryption uses a two-tier key system:
//!
//! 1. **Master Key**: Derived from (user identity, password) using Argon2id.
//!    This key is never stored - it's derived each time the user unlocks.
//!
//! 2. **Data Key**: A random key generated for each record.
//!    The data key is encrypted ("wrapped") with the master key and stored
//!    alongside the encrypted fields.
//!
//! This architecture means the backend only ever sees ciphertext: neither
//! the master key nor any unwrapped data key is serialized, and compromising
//! one record's data key does not affect any other record.

mod cipher;
mod envelope;
mod error;
mod key;

pub use cipher::{decrypt, encrypt, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use envelope::{decrypt_text, encrypt_text, unwrap_key, wrap_key, EncryptedField};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_key, derive_master_key, generate_data_key, DataKey, KdfParams, MasterKey, Salt,
    KEY_SIZE, SALT_SIZE,
};
