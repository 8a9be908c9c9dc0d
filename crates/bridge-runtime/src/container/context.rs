//! # Bridge Context
//!
//! Owns the cache, store and sink handles for the lifetime of the process.
//!
//! `close()` shuts the sink socket, closes the Postgres pool and drops the
//! Redis connection. Drop the `Bridge` first so the context holds the last
//! handles. If the context is dropped without `close()` the handles are
//! still released by their own destructors and the drop is logged.

use std::sync::Arc;

use anyhow::{Context, Result};
use bridge_crypto::PayloadCodec;
use bridge_sync::{Bridge, BridgeDependencies, SystemTimeSource, MONITORS_TABLE};
use bridge_types::BufferCollection;
use tracing::{debug, info, warn};

use crate::adapters::{PgDocumentStore, RedisCache, ZmqPushSink};
use crate::container::BridgeConfig;

/// Production bridge type.
pub type ProductionBridge = Bridge<RedisCache, PgDocumentStore, ZmqPushSink, SystemTimeSource>;

pub struct BridgeContext {
    cache: Arc<RedisCache>,
    store: Arc<PgDocumentStore>,
    sink: Arc<ZmqPushSink>,
    closed: bool,
}

impl BridgeContext {
    /// Connect the cache and the store and check the store schema. The sink
    /// connects on first send.
    pub async fn connect(config: &BridgeConfig) -> Result<Self> {
        let cache = RedisCache::connect(&config.cache).await.with_context(|| {
            format!("connecting to cache at {}:{}", config.cache.host, config.cache.port)
        })?;
        let store = PgDocumentStore::connect(&config.store).await.with_context(|| {
            format!(
                "connecting to durable store at {}:{}",
                config.store.host, config.store.port
            )
        })?;

        let mut tables = vec![config.store.queue_table.as_str(), MONITORS_TABLE];
        tables.extend(BufferCollection::ALL.iter().map(|c| c.name()));
        store
            .verify_tables(&tables)
            .await
            .context("checking durable store schema")?;

        Ok(Self {
            cache: Arc::new(cache),
            store: Arc::new(store),
            sink: Arc::new(ZmqPushSink::new(config.sink.endpoint())),
            closed: false,
        })
    }

    pub fn bridge(&self, config: &BridgeConfig, codec: PayloadCodec) -> ProductionBridge {
        let deps = BridgeDependencies {
            cache: Arc::clone(&self.cache),
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            time_source: SystemTimeSource,
            codec: Arc::new(codec),
        };
        Bridge::new(deps, config.settings())
    }

    pub async fn close(mut self) {
        self.sink.shutdown().await;
        debug!(endpoint = self.sink.endpoint(), "Sink socket closed");
        self.store.close().await;
        debug!("Durable store pool closed");
        if Arc::strong_count(&self.cache) > 1 {
            warn!("Cache connection still shared at close");
        }
        self.closed = true;
        info!("Bridge connections closed");
    }
}

impl Drop for BridgeContext {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                store_closed = self.store.is_closed(),
                "Bridge context dropped without close, releasing connections"
            );
        }
    }
}
