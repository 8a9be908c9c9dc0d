//! # Bridge Sync
//!
//! Propagates pending monitor and reaction changes from the control-plane
//! queue table into the worker cache, forwards manual check requests to the
//! sink, and replays audit records buffered in the cache while the durable
//! store was down.
//!
//! ## Control Flow
//!
//! ```text
//! start ──→ StartupReconciler (once) ──→ QueuePoller ─┐
//!                                            ↑        │ fetch snapshot
//!                                            │        ↓
//!                                          sleep ← ActionDispatcher (per record)
//! ```
//!
//! ## Transition Table
//!
//! | type | action | steps | retire |
//! |------|--------|-------|--------|
//! | monitor | delete | Remove | yes |
//! | monitor | edit | Remove → Install | once, after Install |
//! | monitor | create | Install | yes, then status = "monitored" |
//! | monitor | sink | Publish | yes |
//! | reaction | delete | Remove | yes |
//! | reaction | edit | Remove → Install | once, after Install |
//! | reaction | create | Install | yes |
//!
//! ## Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | 1 | Record retired only after its side effect is confirmed | `service/dispatcher.rs` |
//! | 2 | Schedule membership iff datacenter list names this deployment | `domain/placement.rs` |
//! | 3 | Removal never blocks the pipeline | `service/cache_state.rs` |
//! | 4 | Buffer record removed only after a confirmed durable insert | `service/reconciler.rs` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - In-memory cache, document store, sink, clock       │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - BridgeApi                                  │
//! │  ports/outbound.rs - CacheStore, DocumentStore, SinkTransport   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/transition.rs - (type, action) → steps                  │
//! │  domain/placement.rs  - datacenter locality                     │
//! │  domain/value_objects.rs - settings, outcomes, reports          │
//! │  domain/errors.rs     - CacheError, StoreError, DispatchError   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::{
    ActionDispatcher, Bridge, BridgeDependencies, CacheStateStore, QueuePoller, SinkPublisher,
    StartupReconciler,
};
