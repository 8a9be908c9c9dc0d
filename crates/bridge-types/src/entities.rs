//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Queue**: `QueueItem`, `EntityKind`, `QueueAction`
//! - **Payload**: `Entity`
//! - **Cache layout**: `CacheKey`, `BufferCollection`

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

// =============================================================================
// CLUSTER A: THE QUEUE
// =============================================================================

/// Kind of entity a queue record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A health-check definition executed by the workers.
    Monitor,
    /// An action run by the workers when a monitor changes state.
    Reaction,
}

impl EntityKind {
    /// Cache key prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Monitor => "monitor",
            EntityKind::Reaction => "reaction",
        }
    }

    /// Name of the entity field holding the identifier.
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::Monitor => "cid",
            EntityKind::Reaction => "rid",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Change requested by a queue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueAction {
    Create,
    Delete,
    Edit,
    /// Ad-hoc check request forwarded to the sink.
    Sink,
}

impl fmt::Display for QueueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueAction::Create => "create",
            QueueAction::Delete => "delete",
            QueueAction::Edit => "edit",
            QueueAction::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// A pending change record read from the durable queue table.
///
/// Created by the control-plane, consumed and deleted by the bridge, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Store-assigned identifier, used to retire the record.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub action: QueueAction,
    pub item: Entity,
}

impl QueueItem {
    /// Decode a raw queue document.
    ///
    /// `id` is the store key of the row and wins over any `id` inside the
    /// document body.
    pub fn from_document(id: &str, mut body: Value) -> Result<Self, ModelError> {
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        serde_json::from_value(body).map_err(|e| ModelError::MalformedRecord {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Identifier of the entity carried by this record.
    pub fn entity_id(&self) -> Result<&str, ModelError> {
        self.item.id_for(self.kind)
    }

    /// Cache key of the entity carried by this record.
    pub fn cache_key(&self) -> Result<CacheKey, ModelError> {
        Ok(CacheKey::new(self.kind, self.entity_id()?))
    }
}

// =============================================================================
// CLUSTER B: THE PAYLOAD
// =============================================================================

/// Entity payload carried inside a queue record.
///
/// `data` holds plaintext JSON when `encrypted` is false and a sealed token
/// (a JSON string) when it is true. Fields the bridge does not interpret are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Monitor correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// Reaction id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failcount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastrun: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    /// Plaintext monitor with empty data.
    pub fn monitor(cid: impl Into<String>) -> Self {
        Self {
            cid: Some(cid.into()),
            ..Self::empty()
        }
    }

    /// Plaintext reaction with empty data.
    pub fn reaction(rid: impl Into<String>) -> Self {
        Self {
            rid: Some(rid.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            cid: None,
            rid: None,
            data: Value::Object(Map::new()),
            encrypted: false,
            failcount: None,
            lastrun: None,
            extra: Map::new(),
        }
    }

    /// Replace `data`.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Identifier for the given kind.
    pub fn id_for(&self, kind: EntityKind) -> Result<&str, ModelError> {
        let id = match kind {
            EntityKind::Monitor => self.cid.as_deref(),
            EntityKind::Reaction => self.rid.as_deref(),
        };
        id.ok_or(ModelError::MissingIdentifier {
            kind,
            field: kind.id_field(),
        })
    }

    /// Target datacenters listed in `data.datacenter`.
    ///
    /// `None` when the field is absent (or `data` is still sealed). A bare
    /// string is read as a one-element list.
    pub fn datacenters(&self) -> Option<Vec<&str>> {
        match self.data.get("datacenter")? {
            Value::Array(items) => Some(items.iter().filter_map(Value::as_str).collect()),
            Value::String(single) => Some(vec![single.as_str()]),
            _ => Some(Vec::new()),
        }
    }

    /// Name of the schedule set (`data.timer`) this entity runs under.
    pub fn schedule_set(&self) -> Option<&str> {
        self.data.get("timer").and_then(Value::as_str)
    }
}

// =============================================================================
// CLUSTER C: CACHE LAYOUT
// =============================================================================

/// Key of a cache record: `monitor:<cid>` or `reaction:<rid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: EntityKind,
    id: String,
    key: String,
}

impl CacheKey {
    pub fn new(kind: EntityKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            key: format!("{}:{}", kind.prefix(), id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Entity id; also the member stored in schedule sets.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Side key holding the failure counter.
    pub fn failcount(&self) -> String {
        format!("{}:failcount", self.key)
    }

    /// Side key holding the last-run marker.
    pub fn lastrun(&self) -> String {
        format!("{}:lastrun", self.key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Audit collections buffered in the cache while the durable store was down.
///
/// The same name is used for the cache set and the durable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferCollection {
    History,
    Events,
}

impl BufferCollection {
    /// Replay order at startup.
    pub const ALL: [BufferCollection; 2] = [BufferCollection::History, BufferCollection::Events];

    pub fn name(self) -> &'static str {
        match self {
            BufferCollection::History => "history",
            BufferCollection::Events => "events",
        }
    }
}

impl fmt::Display for BufferCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
