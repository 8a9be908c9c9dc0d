//! # Inbound Port - BridgeApi
//!
//! Primary driving port used by the runtime.

use async_trait::async_trait;
use bridge_types::BufferCollection;

use crate::domain::{CycleReport, PollError, ReplayReport};

/// Operations the runtime drives.
///
/// # Example
///
/// ```rust,ignore
/// bridge.reconcile_buffers().await;
/// tokio::select! {
///     result = bridge.run_forever() => result?,
///     _ = shutdown_signal() => {}
/// }
/// ```
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Replay buffered audit records into the durable store, once.
    async fn reconcile_buffers(&self) -> Vec<(BufferCollection, ReplayReport)>;

    /// Fetch the queue snapshot and apply every record in it.
    async fn run_cycle(&self) -> Result<CycleReport, PollError>;

    /// Poll forever. Returns only on a fatal error.
    async fn run_forever(&self) -> Result<(), PollError>;
}
