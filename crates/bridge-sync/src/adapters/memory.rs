use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::{CacheError, SinkError, StoreError};
use crate::ports::{CacheStore, DocumentStore, SinkTransport, StoredDocument, TimeSource};

// =============================================================================
// CACHE
// =============================================================================

#[derive(Default)]
struct CacheState {
    values: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// In-memory cache for unit tests.
///
/// `fail_writes` makes `set`/`add_to_set` fail; `fail_deletes` makes
/// `delete`/`remove_from_set` fail.
#[derive(Default)]
pub struct InMemoryCache {
    state: Mutex<CacheState>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.state.lock().values.get(key).cloned()
    }

    pub fn is_member(&self, set: &str, member: &str) -> bool {
        self.state
            .lock()
            .sets
            .get(set)
            .is_some_and(|members| members.contains(member))
    }

    pub fn set_len(&self, set: &str) -> usize {
        self.state.lock().sets.get(set).map_or(0, BTreeSet::len)
    }

    /// Seed a set directly, bypassing fault injection.
    pub fn seed_set(&self, set: &str, members: impl IntoIterator<Item = String>) {
        self.state
            .lock()
            .sets
            .entry(set.to_string())
            .or_default()
            .extend(members);
    }

    fn check(&self, flag: &AtomicBool, op: &'static str, key: &str) -> Result<(), CacheError> {
        if flag.load(Ordering::SeqCst) {
            return Err(CacheError::Command {
                op,
                key: key.to_string(),
                reason: "injected fault".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check(&self.fail_writes, "SET", key)?;
        self.state
            .lock()
            .values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check(&self.fail_deletes, "DEL", key)?;
        self.state.lock().values.remove(key);
        Ok(())
    }

    async fn add_to_set(&self, set: &str, member: &str) -> Result<(), CacheError> {
        self.check(&self.fail_writes, "SADD", set)?;
        self.state
            .lock()
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn remove_from_set(&self, set: &str, member: &str) -> Result<(), CacheError> {
        self.check(&self.fail_deletes, "SREM", set)?;
        if let Some(members) = self.state.lock().sets.get_mut(set) {
            members.remove(member);
        }
        Ok(())
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .state
            .lock()
            .sets
            .get(set)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// In-memory document store for unit tests.
///
/// Tables keep insertion order. While `set_available(false)` is in effect
/// every call fails with `StoreError::Unavailable`.
pub struct InMemoryDocumentStore {
    tables: Mutex<HashMap<String, Vec<StoredDocument>>>,
    deletes: Mutex<Vec<(String, String)>>,
    available: AtomicBool,
    next_id: AtomicU64,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            deletes: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Seed a row directly.
    pub fn put(&self, table: &str, id: &str, body: Value) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.to_string(),
                body,
            });
    }

    pub fn get(&self, table: &str, id: &str) -> Option<Value> {
        self.tables
            .lock()
            .get(table)?
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.body.clone())
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Successful `delete` calls, as (table, id).
    pub fn deletions(&self) -> Vec<(String, String)> {
        self.deletes.lock().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store offline".to_string()))
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn fetch_all(&self, table: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.check()?;
        Ok(self.tables.lock().get(table).cloned().unwrap_or_default())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<u64, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|doc| doc.id != id);
        let deleted = (before - rows.len()) as u64;
        if deleted > 0 {
            self.deletes
                .lock()
                .push((table.to_string(), id.to_string()));
        }
        Ok(deleted)
    }

    async fn update_field(
        &self,
        table: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<u64, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock();
        let Some(doc) = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(0);
        };
        match doc.body.as_object_mut() {
            Some(map) => {
                map.insert(field.to_string(), value);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert(&self, table: &str, document: Value) -> Result<u64, StoreError> {
        self.check()?;
        let id = match document.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        let mut tables = self.tables.lock();
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|doc| doc.id == id) {
            return Ok(0);
        }
        rows.push(StoredDocument { id, body: document });
        Ok(1)
    }
}

// =============================================================================
// SINK + CLOCK
// =============================================================================

/// Sink that records every message it is handed.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl SinkTransport for RecordingSink {
    async fn send(&self, message: &str) -> Result<(), SinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Send("injected fault".to_string()));
        }
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub f64);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> f64 {
        self.0
    }
}
