//! Redis implementation of `CacheStore`.

use async_trait::async_trait;
use bridge_sync::{CacheError, CacheStore};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::debug;

use crate::container::CacheConfig;

/// Cache backed by one multiplexed Redis connection.
///
/// The connection is cloned per command; clones share the underlying socket.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                db: config.db,
                password: config.password.clone(),
                ..RedisConnectionInfo::default()
            },
        };
        let client = redis::Client::open(info).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        debug!(host = %config.host, port = config.port, db = config.db, "Connected to cache");
        Ok(Self { conn })
    }
}

fn unavailable(e: redis::RedisError) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

fn command<'a>(op: &'static str, key: &'a str) -> impl FnOnce(redis::RedisError) -> CacheError + 'a {
    move |e| CacheError::Command {
        op,
        key: key.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(command("SET", key))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(command("DEL", key))
    }

    async fn add_to_set(&self, set: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(set, member)
            .await
            .map_err(command("SADD", set))
    }

    async fn remove_from_set(&self, set: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.srem::<_, _, ()>(set, member)
            .await
            .map_err(command("SREM", set))
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.smembers(set).await.map_err(command("SMEMBERS", set))
    }
}
