//! # Error Types
//!
//! Errors raised while interpreting queue records.

use crate::entities::EntityKind;
use thiserror::Error;

/// Errors that can occur while reading the data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The entity does not carry the identifier its kind requires
    /// (`cid` for monitors, `rid` for reactions).
    #[error("{kind} entity is missing its `{field}` identifier")]
    MissingIdentifier {
        kind: EntityKind,
        field: &'static str,
    },

    /// A queue document could not be decoded into a `QueueItem`.
    #[error("Malformed queue record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },
}
