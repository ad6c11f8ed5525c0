//! Session lock error types.

use solace_crypto::CryptoError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur in the session lock controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unlock was attempted before the platform capability check completed.
    #[error("encryption capability check has not completed")]
    NotReady,

    /// The platform lacks the required crypto primitives. The feature must
    /// be disabled, never silently degraded to plaintext.
    #[error("encryption is not supported on this platform")]
    Unsupported,

    /// The derived key failed the known-ciphertext check.
    #[error("incorrect password")]
    IncorrectPassword,

    /// An operation that needs the master key was attempted while locked.
    #[error("encryption is locked")]
    Locked,

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
