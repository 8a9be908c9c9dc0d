//! # Postgres Document Store
//!
//! Every collection is a document table:
//!
//! ```sql
//! CREATE TABLE <name> (
//!     seq BIGSERIAL,
//!     id  TEXT PRIMARY KEY,
//!     doc JSONB NOT NULL
//! );
//! ```
//!
//! `seq` gives the queue its insertion order. Table names are interpolated
//! into SQL, so every name goes through `is_valid_identifier` first.
//!
//! The schema belongs to the control plane. The bridge only checks that the
//! tables it needs exist and refuses to start otherwise.

use std::time::Duration;

use async_trait::async_trait;
use bridge_sync::{DocumentStore, StoreError, StoredDocument};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use crate::container::StoreConfig;

const MAX_CONNECTIONS: u32 = 4;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Postgres identifiers: ASCII letter or underscore first, then letters,
/// digits or underscores, at most 63 bytes.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 63
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn table_ident(table: &str) -> Result<&str, StoreError> {
    if is_valid_identifier(table) {
        Ok(table)
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}

fn query_error(table: &str, e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Query {
            table: table.to_string(),
            reason: other.to_string(),
        },
    }
}

fn require_tables(missing: Vec<String>) -> Result<(), StoreError> {
    if missing.is_empty() {
        return Ok(());
    }
    error!(tables = ?missing, "Durable store schema is missing tables");
    Err(StoreError::MissingTables(missing))
}

/// Document store over a `PgPool`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(auth_key) = &config.auth_key {
            options = options.password(auth_key);
        }

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        debug!(host = %config.host, database = %config.database, "Connected to durable store");
        Ok(Self { pool })
    }

    /// Check that every table exists, naming the missing ones.
    pub async fn verify_tables(&self, tables: &[&str]) -> Result<(), StoreError> {
        let mut missing = Vec::new();
        for table in tables {
            let table = table_ident(table)?;
            let (present,): (bool,) = sqlx::query_as("SELECT to_regclass($1) IS NOT NULL")
                .bind(table)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| query_error(table, e))?;
            if !present {
                missing.push(table.to_string());
            }
        }
        require_tables(missing)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch_all(&self, table: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let table = table_ident(table)?;
        let rows = sqlx::query_as::<_, (String, Value)>(&format!(
            "SELECT id, doc FROM {table} ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error(table, e))?;

        Ok(rows
            .into_iter()
            .map(|(id, body)| StoredDocument { id, body })
            .collect())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<u64, StoreError> {
        let table = table_ident(table)?;
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error(table, e))?;
        Ok(result.rows_affected())
    }

    async fn update_field(
        &self,
        table: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<u64, StoreError> {
        let table = table_ident(table)?;
        let result = sqlx::query(&format!(
            "UPDATE {table} SET doc = jsonb_set(doc, $2::text[], $3, true) WHERE id = $1"
        ))
        .bind(id)
        .bind(vec![field.to_string()])
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error(table, e))?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, table: &str, document: Value) -> Result<u64, StoreError> {
        let table = table_ident(table)?;
        let id = match document.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let result = sqlx::query(&format!(
            "INSERT INTO {table} (id, doc) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING"
        ))
        .bind(id)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error(table, e))?;
        Ok(result.rows_affected())
    }
}
