//! # Startup Reconciler
//!
//! Replays audit records that writers buffered in the cache while the
//! durable store was unreachable.
//!
//! Single pass per collection. A buffered record is removed from the cache
//! only after the durable insert is confirmed; anything that fails stays
//! buffered for the next process start.

use std::sync::Arc;

use bridge_types::BufferCollection;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::ReplayReport;
use crate::ports::{CacheStore, DocumentStore};

pub struct StartupReconciler<C: CacheStore, D: DocumentStore> {
    cache: Arc<C>,
    store: Arc<D>,
}

impl<C: CacheStore, D: DocumentStore> StartupReconciler<C, D> {
    pub fn new(cache: Arc<C>, store: Arc<D>) -> Self {
        Self { cache, store }
    }

    /// Replay every buffer collection.
    pub async fn run(&self) -> Vec<(BufferCollection, ReplayReport)> {
        let mut reports = Vec::with_capacity(BufferCollection::ALL.len());
        for collection in BufferCollection::ALL {
            let report = self.replay(collection).await;
            info!(
                collection = %collection,
                imported = report.imported,
                remaining = report.remaining,
                "Imported {} {} records from cache to durable store",
                report.imported,
                collection
            );
            reports.push((collection, report));
        }
        reports
    }

    /// Replay one collection.
    ///
    /// A record counts as imported once it is in the store and gone from
    /// the cache; every other record counts as remaining.
    pub async fn replay(&self, collection: BufferCollection) -> ReplayReport {
        let name = collection.name();
        let members = match self.cache.set_members(name).await {
            Ok(members) => members,
            Err(e) => {
                warn!(collection = name, error = %e, "Cannot read buffered records");
                return ReplayReport::default();
            }
        };

        let mut report = ReplayReport::default();
        for raw in members {
            let record: Value = match serde_json::from_str(&raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(collection = name, error = %e, "Skipping unparseable buffered record");
                    report.remaining += 1;
                    continue;
                }
            };

            if let Err(e) = self.store.insert(name, record).await {
                debug!(collection = name, error = %e, "Durable insert failed, record stays buffered");
                report.remaining += 1;
                continue;
            }

            if let Err(e) = self.cache.remove_from_set(name, &raw).await {
                // Replayed again on the next start; the store skips duplicate ids.
                warn!(collection = name, error = %e, "Imported record could not be unbuffered");
                report.remaining += 1;
                continue;
            }
            report.imported += 1;
        }
        report
    }
}
