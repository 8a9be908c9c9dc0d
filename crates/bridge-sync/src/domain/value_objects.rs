//! Settings, outcomes and reports.

use std::time::Duration;

use serde::Deserialize;

/// Durable table holding monitor definitions.
pub const MONITORS_TABLE: &str = "monitors";

/// Status written to a monitor once it is cached.
pub const MONITORED_STATUS: &str = "monitored";

/// What to do when a payload cannot be sealed or opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecFailurePolicy {
    /// Leave the record queued and continue with the next one.
    #[default]
    SkipRecord,
    /// Stop the current snapshot; the next cycle starts over.
    AbortCycle,
    /// Stop the bridge with an error.
    Exit,
}

/// Runtime settings for the sync services.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Queue table polled for pending records.
    pub queue_table: String,
    /// Identifier of this deployment in monitor datacenter lists.
    pub datacenter: String,
    /// Sleep between poll cycles.
    pub poll_interval: Duration,
    /// Environment tag attached to sink messages.
    pub env_name: String,
    /// Metrics key tag attached to sink messages.
    pub metrics_key: String,
    pub codec_failure_policy: CodecFailurePolicy,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            queue_table: "dc1queue".to_string(),
            datacenter: "dc1queue".to_string(),
            poll_interval: Duration::from_secs(10),
            env_name: "development".to_string(),
            metrics_key: String::new(),
            codec_failure_policy: CodecFailurePolicy::default(),
        }
    }
}

/// Result of a cache removal.
///
/// Removal never fails the caller; `BestEffort` lists the commands that did
/// not go through so they can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    Confirmed,
    BestEffort { failures: Vec<String> },
}

impl RemovalOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, RemovalOutcome::Confirmed)
    }
}

/// What happened to one queue record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Side effects applied and the record deleted from the queue.
    Retired,
    /// A side effect did not go through; the record stays for the next cycle.
    Deferred { reason: String },
    /// The record has no applicable behavior and stays in the queue.
    Unsupported,
}

/// Per-cycle counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records in the fetched snapshot.
    pub fetched: usize,
    pub retired: usize,
    pub deferred: usize,
    pub unsupported: usize,
    /// Records that could not be decoded.
    pub malformed: usize,
    /// Records whose dispatch returned an error.
    pub failed: usize,
    /// Snapshot stopped early by `CodecFailurePolicy::AbortCycle`.
    pub aborted: bool,
}

/// Result of replaying one buffer collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub imported: usize,
    /// Records still buffered after the pass.
    pub remaining: usize,
}
