//! # Sink Envelope
//!
//! Wire shape pushed to the manual-check sink: the entity's own fields plus
//! a `time_tracking` block and a fixed `zone` label.

use serde::{Deserialize, Serialize};

use crate::entities::Entity;

/// Zone label attached to every manually triggered check.
pub const SINK_ZONE: &str = "Web API";

/// Timing metadata consumed by the downstream metrics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTracking {
    /// Unix epoch seconds at which the bridge forwarded the request.
    pub control: f64,
    /// Metrics key tag.
    pub ez_key: String,
    /// Deployment environment name.
    pub env: String,
}

/// Message pushed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkEnvelope {
    #[serde(flatten)]
    pub entity: Entity,
    pub time_tracking: TimeTracking,
    pub zone: String,
}

impl SinkEnvelope {
    /// Wrap an entity. Stale envelope fields left in the entity by an earlier
    /// hop are dropped so the JSON object has unique keys.
    pub fn wrap(mut entity: Entity, time_tracking: TimeTracking) -> Self {
        entity.extra.remove("time_tracking");
        entity.extra.remove("zone");
        Self {
            entity,
            time_tracking,
            zone: SINK_ZONE.to_string(),
        }
    }
}
