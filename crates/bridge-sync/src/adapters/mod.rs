//! # Adapters Module
//!
//! In-memory implementations of the outbound ports, with fault injection.
//! Production adapters live in the runtime crate.

mod memory;

pub use memory::{FixedTimeSource, InMemoryCache, InMemoryDocumentStore, RecordingSink};
