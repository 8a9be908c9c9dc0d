//! # Bridge Types Crate
//!
//! Data model shared by the bridge crates: the queue record written by the
//! control-plane, the entity payload it carries, the cache key layout read by
//! the workers, and the envelope pushed to the sink.
//!
//! ## Design Principles
//!
//! - **Envelope preservation**: unknown entity fields survive a round trip
//!   through the bridge untouched (`Entity::extra`).
//! - **Opaque payload**: `data` is either plaintext JSON or a sealed token;
//!   only the codec in `bridge-crypto` turns one into the other.
//! - **Closed vocabulary**: entity kinds and queue actions are enums, so an
//!   unknown value fails at the deserialization boundary instead of inside
//!   the dispatcher.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::{SinkEnvelope, TimeTracking, SINK_ZONE};
pub use errors::ModelError;
