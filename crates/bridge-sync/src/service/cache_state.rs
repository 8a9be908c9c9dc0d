//! # Cache State Store
//!
//! Writes and removes entity records in the worker cache.
//!
//! Layout per entity:
//! - `<kind>:<id>`: serialized entity, `data` sealed when flagged encrypted
//! - `<kind>:<id>:failcount`, `<kind>:<id>:lastrun`: scalar side counters
//! - `<timer>` set: holds `<id>` while the entity is scheduled here

use std::sync::Arc;

use bridge_crypto::PayloadCodec;
use bridge_types::{CacheKey, Entity};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{CacheError, DispatchError, RemovalOutcome};
use crate::ports::CacheStore;

pub struct CacheStateStore<C: CacheStore> {
    cache: Arc<C>,
    codec: Arc<PayloadCodec>,
}

impl<C: CacheStore> CacheStateStore<C> {
    pub fn new(cache: Arc<C>, codec: Arc<PayloadCodec>) -> Self {
        Self { cache, codec }
    }

    /// Write side counters, schedule membership and the main record.
    ///
    /// `entity` must arrive with plaintext `data`; it is sealed here before
    /// the main record is written. Any cache fault is returned so the
    /// caller can leave the queue record in place.
    pub async fn upsert(
        &self,
        key: &CacheKey,
        mut entity: Entity,
        join_schedule: bool,
    ) -> Result<(), DispatchError> {
        if join_schedule {
            match entity.schedule_set() {
                Some(set) => self.cache.add_to_set(set, key.id()).await?,
                None => warn!(%key, "Local entity has no timer, not scheduled"),
            }
        }
        if let Some(failcount) = &entity.failcount {
            self.cache.set(&key.failcount(), &scalar(failcount)).await?;
        }
        if let Some(lastrun) = &entity.lastrun {
            self.cache.set(&key.lastrun(), &scalar(lastrun)).await?;
        }

        self.codec.seal(&mut entity)?;
        let record = serde_json::to_string(&entity).map_err(|e| CacheError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.cache.set(key.as_str(), &record).await?;
        Ok(())
    }

    /// Drop schedule membership and the main record.
    ///
    /// Never fails: commands that do not go through are reported in
    /// `RemovalOutcome::BestEffort` and the pipeline moves on.
    pub async fn remove(&self, key: &CacheKey, entity: &Entity) -> RemovalOutcome {
        let mut failures = Vec::new();

        if let Some(set) = entity.schedule_set() {
            if let Err(e) = self.cache.remove_from_set(set, key.id()).await {
                failures.push(e.to_string());
            }
        }
        if let Err(e) = self.cache.delete(key.as_str()).await {
            failures.push(e.to_string());
        }

        if failures.is_empty() {
            RemovalOutcome::Confirmed
        } else {
            debug!(%key, ?failures, "Cache removal incomplete");
            RemovalOutcome::BestEffort { failures }
        }
    }
}

/// Render a counter the way the workers read it back: strings verbatim,
/// everything else as JSON text.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
