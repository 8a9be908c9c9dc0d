//! # Domain Errors
//!
//! One error type per collaborator, folded into `DispatchError` at the
//! dispatcher boundary.

use bridge_crypto::CodecError;
use bridge_types::ModelError;
use thiserror::Error;

/// Cache command failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Connection to the cache is unavailable.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A single command failed.
    #[error("Cache {op} on {key} failed: {reason}")]
    Command {
        op: &'static str,
        key: String,
        reason: String,
    },

    /// The record could not be serialized for the cache.
    #[error("Cannot encode cache record {key}: {reason}")]
    Encode { key: String, reason: String },
}

/// Durable store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection to the store is unavailable.
    #[error("Durable store unavailable: {0}")]
    Unavailable(String),

    /// A query against a table failed.
    #[error("Query on {table} failed: {reason}")]
    Query { table: String, reason: String },

    /// Table name is not a plain identifier.
    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    /// Expected tables are absent from the schema.
    #[error("Missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),
}

/// Sink transmission failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("Cannot connect to sink at {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("Sink send failed: {0}")]
    Send(String),

    #[error("Cannot encode sink message: {0}")]
    Encode(String),
}

/// Failure while applying one queue record.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Payload codec failure: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl DispatchError {
    /// Codec faults are governed by `CodecFailurePolicy`; everything else
    /// just leaves the record queued.
    pub fn is_codec(&self) -> bool {
        matches!(self, DispatchError::Codec(_))
    }
}

/// Failure of a whole poll cycle.
#[derive(Debug, Error)]
pub enum PollError {
    /// The queue snapshot could not be fetched.
    #[error("Cannot fetch queue snapshot: {0}")]
    Fetch(#[from] StoreError),

    /// A record failed in a way configured to stop the bridge.
    #[error("Queue record {queue_id} stopped the bridge: {source}")]
    Fatal {
        queue_id: String,
        #[source]
        source: DispatchError,
    },
}
