//! # Queue Poller
//!
//! Outer control loop: fetch the whole queue snapshot, dispatch every
//! record in store order, sleep, repeat. One record is finished before the
//! next one starts.

use std::sync::Arc;
use std::time::Duration;

use bridge_types::QueueItem;
use tracing::{debug, error, warn};

use crate::domain::{CodecFailurePolicy, CycleReport, DispatchOutcome, PollError};
use crate::ports::{CacheStore, DocumentStore, SinkTransport, TimeSource};
use crate::service::ActionDispatcher;

pub struct QueuePoller<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    dispatcher: ActionDispatcher<C, D, S, T>,
    store: Arc<D>,
    queue_table: String,
    poll_interval: Duration,
    codec_failure_policy: CodecFailurePolicy,
}

impl<C, D, S, T> QueuePoller<C, D, S, T>
where
    C: CacheStore,
    D: DocumentStore,
    S: SinkTransport,
    T: TimeSource,
{
    pub fn new(
        dispatcher: ActionDispatcher<C, D, S, T>,
        store: Arc<D>,
        queue_table: impl Into<String>,
        poll_interval: Duration,
        codec_failure_policy: CodecFailurePolicy,
    ) -> Self {
        Self {
            dispatcher,
            store,
            queue_table: queue_table.into(),
            poll_interval,
            codec_failure_policy,
        }
    }

    /// Drain one snapshot of the queue.
    pub async fn run_cycle(&self) -> Result<CycleReport, PollError> {
        let snapshot = self.store.fetch_all(&self.queue_table).await?;
        let mut report = CycleReport {
            fetched: snapshot.len(),
            ..CycleReport::default()
        };

        for document in snapshot {
            let record = match QueueItem::from_document(&document.id, document.body) {
                Ok(record) => record,
                Err(e) => {
                    warn!(queue_id = %document.id, error = %e, "Skipping malformed queue record");
                    report.malformed += 1;
                    continue;
                }
            };
            debug!(queue_id = %record.id, "Starting to work on queue item");
            let queue_id = record.id.clone();

            match self.dispatcher.dispatch(record).await {
                Ok(DispatchOutcome::Retired) => report.retired += 1,
                Ok(DispatchOutcome::Deferred { .. }) => report.deferred += 1,
                Ok(DispatchOutcome::Unsupported) => report.unsupported += 1,
                Err(e) if e.is_codec() => {
                    report.failed += 1;
                    match self.codec_failure_policy {
                        CodecFailurePolicy::SkipRecord => {
                            warn!(%queue_id, error = %e, "Payload codec failed, record stays queued");
                        }
                        CodecFailurePolicy::AbortCycle => {
                            warn!(%queue_id, error = %e, "Payload codec failed, aborting poll cycle");
                            report.aborted = true;
                            break;
                        }
                        CodecFailurePolicy::Exit => {
                            error!(%queue_id, error = %e, "Payload codec failed, stopping bridge");
                            return Err(PollError::Fatal { queue_id, source: e });
                        }
                    }
                }
                Err(e) => {
                    warn!(%queue_id, error = %e, "Queue record failed, record stays queued");
                    report.failed += 1;
                }
            }
        }

        debug!(?report, "Poll cycle complete");
        Ok(report)
    }

    /// Poll until a fatal error. Fetch failures are logged and retried
    /// after the regular interval.
    pub async fn run_forever(&self) -> Result<(), PollError> {
        loop {
            match self.run_cycle().await {
                Ok(_) => {}
                Err(PollError::Fetch(e)) => {
                    warn!(error = %e, "Cannot fetch queue snapshot, retrying next cycle");
                }
                Err(fatal) => return Err(fatal),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
