//! Configuration and the owned collaborator handles.

pub mod config;
mod context;

pub use config::{BridgeConfig, BridgeSection, CacheConfig, ConfigError, SinkConfig, StoreConfig};
pub use context::{BridgeContext, ProductionBridge};
