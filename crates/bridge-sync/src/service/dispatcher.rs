//! # Action Dispatcher
//!
//! Applies one queue record: opens its payload, runs the steps of its
//! transition against the cache or the sink, and retires the record once
//! every step went through.
//!
//! | Step failure | Effect |
//! |--------------|--------|
//! | Remove | never fails; partial removal is logged |
//! | Install (cache fault) | `Deferred`, record stays queued |
//! | Publish (transport fault) | `Deferred`, record stays queued |
//! | codec fault | `Err(DispatchError::Codec)`, policy decided by the poller |

use std::sync::Arc;

use bridge_crypto::PayloadCodec;
use bridge_telemetry::log_queue_event;
use bridge_types::{CacheKey, EntityKind, QueueItem};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{
    DispatchError, DispatchOutcome, Placement, RemovalOutcome, Step, Transition, MONITORED_STATUS,
    MONITORS_TABLE,
};
use crate::ports::{CacheStore, DocumentStore, SinkTransport, TimeSource};
use crate::service::{CacheStateStore, SinkPublisher};

pub struct ActionDispatcher<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    cache_state: CacheStateStore<C>,
    publisher: SinkPublisher<S, T>,
    store: Arc<D>,
    codec: Arc<PayloadCodec>,
    queue_table: String,
    datacenter: String,
}

impl<C, D, S, T> ActionDispatcher<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    pub fn new(
        cache_state: CacheStateStore<C>,
        publisher: SinkPublisher<S, T>,
        store: Arc<D>,
        codec: Arc<PayloadCodec>,
        queue_table: impl Into<String>,
        datacenter: impl Into<String>,
    ) -> Self {
        Self {
            cache_state,
            publisher,
            store,
            codec,
            queue_table: queue_table.into(),
            datacenter: datacenter.into(),
        }
    }

    /// Apply one record.
    pub async fn dispatch(&self, mut record: QueueItem) -> Result<DispatchOutcome, DispatchError> {
        let Some(transition) = Transition::select(record.kind, record.action) else {
            warn!(
                queue_id = %record.id,
                kind = %record.kind,
                action = %record.action,
                "No behavior for queue record, leaving it queued"
            );
            return Ok(DispatchOutcome::Unsupported);
        };

        self.codec.open(&mut record.item)?;
        let key = record.cache_key()?;

        for step in transition.steps() {
            let applied = match step {
                Step::Remove => {
                    self.remove(&key, &record).await;
                    Ok(())
                }
                Step::Install => self.install(&key, &record).await,
                Step::Publish => self.publish(&key, &record).await,
            };
            match applied {
                Ok(()) => {}
                Err(DispatchError::Cache(e)) => {
                    warn!(queue_id = %record.id, %key, error = %e, "Cache write failed, record stays queued");
                    return Ok(DispatchOutcome::Deferred {
                        reason: e.to_string(),
                    });
                }
                Err(DispatchError::Sink(e)) => {
                    warn!(queue_id = %record.id, %key, error = %e, "Sink send failed, record stays queued");
                    return Ok(DispatchOutcome::Deferred {
                        reason: e.to_string(),
                    });
                }
                Err(other) => return Err(other),
            }
        }

        let deleted = self.retire(&record).await?;
        if record.kind == EntityKind::Monitor && transition.installs() && deleted == 1 {
            self.mark_monitored(key.id()).await;
        }
        Ok(DispatchOutcome::Retired)
    }

    async fn remove(&self, key: &CacheKey, record: &QueueItem) {
        debug!(%key, "Initiating {} deletion", record.kind);
        match self.cache_state.remove(key, &record.item).await {
            RemovalOutcome::Confirmed => info!(%key, "{} removed from cache", record.kind),
            RemovalOutcome::BestEffort { failures } => {
                warn!(%key, ?failures, "{} removal from cache incomplete", record.kind)
            }
        }
    }

    async fn install(&self, key: &CacheKey, record: &QueueItem) -> Result<(), DispatchError> {
        let placement = match record.kind {
            EntityKind::Monitor => Placement::of(&record.item, &self.datacenter),
            EntityKind::Reaction => Placement::Unassigned,
        };
        debug!(%key, placement = placement.label(), "Initiating {} creation", record.kind);

        self.cache_state
            .upsert(key, record.item.clone(), placement.joins_schedule())
            .await?;
        info!(%key, placement = placement.label(), "{} added to cache", record.kind);
        Ok(())
    }

    async fn publish(&self, key: &CacheKey, record: &QueueItem) -> Result<(), DispatchError> {
        info!(%key, "Got a web based health check from the queue, sending to sink");
        self.publisher.publish(record.item.clone()).await?;
        info!(%key, "{} sent to sink", record.kind);
        Ok(())
    }

    async fn retire(&self, record: &QueueItem) -> Result<u64, DispatchError> {
        let deleted = self.store.delete(&self.queue_table, &record.id).await?;
        if deleted == 1 {
            log_queue_event!(debug, record.id, "Queue entry removed from queue table");
        } else {
            log_queue_event!(debug, record.id, "Queue entry already gone", deleted = deleted);
        }
        Ok(deleted)
    }

    /// Status update is reported, never retried.
    async fn mark_monitored(&self, cid: &str) {
        let status = Value::String(MONITORED_STATUS.to_string());
        match self
            .store
            .update_field(MONITORS_TABLE, cid, "status", status)
            .await
        {
            Ok(1) => debug!(cid, "Monitor status changed in durable store"),
            Ok(_) => debug!(cid, "Failed to change monitor status in durable store"),
            Err(e) => warn!(cid, error = %e, "Monitor status update failed"),
        }
    }
}
