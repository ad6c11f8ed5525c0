//! Record facade error types.

use solace_session::SessionError;
use thiserror::Error;

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors surfaced by the record encryption facade.
///
/// `Locked` means the caller should prompt for unlock; `DecryptionFailed`
/// is per-record and must not prevent other records from rendering.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The session is locked (or not ready); no plaintext fallback.
    #[error("encryption is locked")]
    Locked,

    /// Unwrap or field decryption failed for this record: wrong master key,
    /// corruption, or tampering. Nothing was partially decrypted.
    #[error("record could not be decrypted")]
    DecryptionFailed,

    /// Encryption-side crypto failure (e.g. no secure random source).
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl From<SessionError> for RecordError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Locked
            | SessionError::NotReady
            | SessionError::Unsupported
            | SessionError::IncorrectPassword => RecordError::Locked,
            SessionError::Crypto(e) => RecordError::Crypto(e.to_string()),
        }
    }
}
