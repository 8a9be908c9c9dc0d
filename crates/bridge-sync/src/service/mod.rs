//! # Bridge Service
//!
//! Wires the sync components together behind `BridgeApi`.
//!
//! ## Architecture
//!
//! - `CacheStateStore` and `SinkPublisher` adapt the cache and the sink
//! - `ActionDispatcher` applies one queue record
//! - `QueuePoller` drives the dispatcher over queue snapshots
//! - `StartupReconciler` replays buffered audit records once at start
//!
//! All external dependencies are injected through `BridgeDependencies`.

mod cache_state;
mod dispatcher;
mod poller;
mod reconciler;
mod sink_publisher;
#[cfg(test)]
mod tests;

pub use cache_state::CacheStateStore;
pub use dispatcher::ActionDispatcher;
pub use poller::QueuePoller;
pub use reconciler::StartupReconciler;
pub use sink_publisher::SinkPublisher;

use std::sync::Arc;

use async_trait::async_trait;
use bridge_crypto::PayloadCodec;
use bridge_types::BufferCollection;
use tracing::info;

use crate::domain::{BridgeSettings, CycleReport, PollError, ReplayReport};
use crate::ports::{BridgeApi, CacheStore, DocumentStore, SinkTransport, TimeSource};

/// Dependencies for `Bridge`.
pub struct BridgeDependencies<C, D, S, T> {
    pub cache: Arc<C>,
    pub store: Arc<D>,
    pub sink: Arc<S>,
    pub time_source: T,
    pub codec: Arc<PayloadCodec>,
}

/// The sync service.
pub struct Bridge<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    reconciler: StartupReconciler<C, D>,
    poller: QueuePoller<C, D, S, T>,
    settings: BridgeSettings,
}

impl<C, D, S, T> Bridge<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    pub fn new(deps: BridgeDependencies<C, D, S, T>, settings: BridgeSettings) -> Self {
        let cache_state = CacheStateStore::new(Arc::clone(&deps.cache), Arc::clone(&deps.codec));
        let publisher = SinkPublisher::new(
            deps.sink,
            deps.time_source,
            Arc::clone(&deps.codec),
            settings.metrics_key.clone(),
            settings.env_name.clone(),
        );
        let dispatcher = ActionDispatcher::new(
            cache_state,
            publisher,
            Arc::clone(&deps.store),
            deps.codec,
            settings.queue_table.clone(),
            settings.datacenter.clone(),
        );
        let poller = QueuePoller::new(
            dispatcher,
            Arc::clone(&deps.store),
            settings.queue_table.clone(),
            settings.poll_interval,
            settings.codec_failure_policy,
        );

        Self {
            reconciler: StartupReconciler::new(deps.cache, deps.store),
            poller,
            settings,
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }
}

#[async_trait]
impl<C, D, S, T> BridgeApi for Bridge<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    async fn reconcile_buffers(&self) -> Vec<(BufferCollection, ReplayReport)> {
        self.reconciler.run().await
    }

    async fn run_cycle(&self) -> Result<CycleReport, PollError> {
        self.poller.run_cycle().await
    }

    async fn run_forever(&self) -> Result<(), PollError> {
        info!(
            queue = %self.settings.queue_table,
            datacenter = %self.settings.datacenter,
            interval_secs = self.poller.poll_interval().as_secs(),
            "Starting queue watcher"
        );
        self.poller.run_forever().await
    }
}
