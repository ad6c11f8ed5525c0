//! Crypto layer error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the crypto layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The platform cannot supply a cryptographically secure random source.
    /// Callers must disable the encryption feature, never fall back to
    /// plaintext.
    #[error("secure random source unavailable on this platform")]
    UnsupportedPlatform,

    /// Authentication tag verification failed: wrong key, tampered
    /// ciphertext, or tampered nonce.
    #[error("decryption failed (wrong key or tampered data)")]
    AuthenticationFailed,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Base64 or UTF-8 decoding failure on a persisted field.
    #[error("encoding error: {0}")]
    Encoding(String),
}
