//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the runtime implements for the sync services.
//!
//! Production: `RedisCache`, `PgDocumentStore`, `ZmqPushSink`
//! (bridge-runtime/src/adapters/).
//! Testing: `InMemoryCache`, `InMemoryDocumentStore`, `RecordingSink`
//! (adapters/memory.rs).

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CacheError, SinkError, StoreError};

/// Fast key-value cache read by the workers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Set a string value.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Delete a key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Add a member to a set.
    async fn add_to_set(&self, set: &str, member: &str) -> Result<(), CacheError>;

    /// Remove a member from a set. Removing a missing member succeeds.
    async fn remove_from_set(&self, set: &str, member: &str) -> Result<(), CacheError>;

    /// All members of a set, in no particular order.
    async fn set_members(&self, set: &str) -> Result<Vec<String>, CacheError>;
}

/// A row of a document table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub body: Value,
}

/// Durable document store shared with the control-plane.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every row of a table, in the store's natural order.
    async fn fetch_all(&self, table: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Delete a row. Returns the number of rows deleted.
    async fn delete(&self, table: &str, id: &str) -> Result<u64, StoreError>;

    /// Set one top-level field of a row. Returns the number of rows replaced.
    async fn update_field(
        &self,
        table: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<u64, StoreError>;

    /// Insert a document. A document whose `id` already exists is not
    /// inserted twice. Returns the number of rows inserted.
    async fn insert(&self, table: &str, document: Value) -> Result<u64, StoreError>;
}

/// Push channel to the downstream workers.
#[async_trait]
pub trait SinkTransport: Send + Sync {
    /// Transmit one message. Returns once the message is handed to the
    /// transport; no acknowledgment is awaited.
    async fn send(&self, message: &str) -> Result<(), SinkError>;
}

/// Time source, abstracted for deterministic tests.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch, with sub-second precision.
    fn now(&self) -> f64;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}
