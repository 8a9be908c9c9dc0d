//! Codec error types.

use thiserror::Error;

/// Payload sealing errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Key is not urlsafe base64 of 32 bytes
    #[error("Invalid Fernet key")]
    InvalidKey,

    /// Token is malformed, tampered with, or sealed under another key
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Entity is flagged encrypted but `data` is not a token string
    #[error("Payload flagged encrypted is not a sealed token")]
    NotSealed,

    /// Payload does not serialize, or plaintext is not valid JSON
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}
