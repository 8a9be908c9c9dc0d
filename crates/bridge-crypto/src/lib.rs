//! # Bridge Crypto - Payload Sealing
//!
//! `PayloadCodec` seals an entity's `data` field as a Fernet token, the
//! format the web tier writes into the queue and the workers read back out
//! of the cache.
//!
//! Only `data` is ever sealed; the envelope (`cid`, `rid`, `encrypted`, side
//! counters) stays readable so the workers and the bridge can route on it.

#![warn(clippy::all)]

pub mod codec;
pub mod errors;

pub use codec::PayloadCodec;
pub use errors::CodecError;
