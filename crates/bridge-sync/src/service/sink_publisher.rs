//! # Sink Publisher
//!
//! Forwards manually triggered checks to the workers over the push channel.

use std::sync::Arc;

use bridge_crypto::PayloadCodec;
use bridge_types::{Entity, SinkEnvelope, TimeTracking};

use crate::domain::{DispatchError, SinkError};
use crate::ports::{SinkTransport, TimeSource};

pub struct SinkPublisher<S: SinkTransport, T: TimeSource> {
    transport: Arc<S>,
    time_source: T,
    codec: Arc<PayloadCodec>,
    metrics_key: String,
    env_name: String,
}

impl<S: SinkTransport, T: TimeSource> SinkPublisher<S, T> {
    pub fn new(
        transport: Arc<S>,
        time_source: T,
        codec: Arc<PayloadCodec>,
        metrics_key: impl Into<String>,
        env_name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            time_source,
            codec,
            metrics_key: metrics_key.into(),
            env_name: env_name.into(),
        }
    }

    /// Build the wire message for an entity with plaintext `data`.
    pub fn envelope(&self, mut entity: Entity) -> Result<SinkEnvelope, DispatchError> {
        self.codec.seal(&mut entity)?;
        Ok(SinkEnvelope::wrap(
            entity,
            TimeTracking {
                control: self.time_source.now(),
                ez_key: self.metrics_key.clone(),
                env: self.env_name.clone(),
            },
        ))
    }

    /// Seal, wrap and transmit. Fire-and-forget: success means the
    /// transport accepted the message.
    pub async fn publish(&self, entity: Entity) -> Result<(), DispatchError> {
        let envelope = self.envelope(entity)?;
        let message =
            serde_json::to_string(&envelope).map_err(|e| SinkError::Encode(e.to_string()))?;
        self.transport.send(&message).await?;
        Ok(())
    }
}
