//! # Payload Codec
//!
//! Seals and opens the `data` field of an entity with the process-wide
//! Fernet key shared with the web tier and the workers.
//!
//! A sealed payload is a JSON string holding the Fernet token of
//! `json(data)`:
//!
//! ```text
//! urlsafe_b64( 0x80 ‖ timestamp ‖ iv ‖ AES-128-CBC(json) ‖ HMAC-SHA256 )
//! ```
//!
//! Tokens carry no expiry check; a record may sit in the queue for any
//! length of time.

use std::fmt;

use bridge_types::Entity;
use fernet::Fernet;
use serde_json::Value;

use crate::CodecError;

/// Encrypts and decrypts entity payloads.
#[derive(Clone)]
pub struct PayloadCodec {
    fernet: Fernet,
}

impl PayloadCodec {
    /// Build from a urlsafe-base64 Fernet key (32 bytes once decoded).
    pub fn new(key: &str) -> Result<Self, CodecError> {
        Fernet::new(key.trim())
            .map(|fernet| Self { fernet })
            .ok_or(CodecError::InvalidKey)
    }

    /// Seal a plaintext payload into a token value.
    pub fn encrypt_payload(&self, plain: &Value) -> Result<Value, CodecError> {
        let json =
            serde_json::to_vec(plain).map_err(|e| CodecError::InvalidPayload(e.to_string()))?;
        Ok(Value::String(self.fernet.encrypt(&json)))
    }

    /// Open a token value back into its plaintext payload.
    pub fn decrypt_payload(&self, sealed: &Value) -> Result<Value, CodecError> {
        let token = sealed.as_str().ok_or(CodecError::NotSealed)?;
        let plain = self
            .fernet
            .decrypt(token)
            .map_err(|_| CodecError::DecryptionFailed)?;
        serde_json::from_slice(&plain).map_err(|e| CodecError::InvalidPayload(e.to_string()))
    }

    /// Seal `entity.data` in place when the entity is flagged encrypted.
    pub fn seal(&self, entity: &mut Entity) -> Result<(), CodecError> {
        if entity.encrypted {
            entity.data = self.encrypt_payload(&entity.data)?;
        }
        Ok(())
    }

    /// Open `entity.data` in place when the entity is flagged encrypted.
    pub fn open(&self, entity: &mut Entity) -> Result<(), CodecError> {
        if entity.encrypted {
            entity.data = self.decrypt_payload(&entity.data)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadCodec").finish_non_exhaustive()
    }
}
