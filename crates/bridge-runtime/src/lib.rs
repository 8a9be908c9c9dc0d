//! # Monitor Bridge Runtime
//!
//! Production wiring for the bridge: configuration, the Redis cache, the
//! Postgres document store and the ZMTP push sink.
//!
//! ## Modular Structure
//!
//! - `container/` - `BridgeConfig` (TOML + env overrides) and `BridgeContext`
//! - `adapters/` - `RedisCache`, `PgDocumentStore`, `ZmqPushSink`
//! - `shutdown` - `ShutdownSignal`, installed before startup
//!
//! ## Startup Sequence
//!
//! 1. Parse the single positional argument (config path)
//! 2. Load and validate the configuration
//! 3. Install the log subscriber and the signal handlers
//! 4. Connect the cache and the durable store, check the schema
//! 5. Replay buffered history and event records
//! 6. Watch the queue
//! 7. Close the connections
//!
//! SIGTERM or Ctrl-C during steps 4 to 6 skips to step 7 and exits 0.

pub mod adapters;
pub mod container;
pub mod shutdown;

pub use adapters::{PgDocumentStore, RedisCache, ZmqPushSink};
pub use container::{BridgeConfig, BridgeContext, ConfigError, ProductionBridge};
pub use shutdown::ShutdownSignal;
