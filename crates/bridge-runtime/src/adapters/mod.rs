//! Production implementations of the bridge ports.

mod postgres_store;
mod redis_cache;
mod zmq_sink;

pub use postgres_store::{is_valid_identifier, PgDocumentStore};
pub use redis_cache::RedisCache;
pub use zmq_sink::ZmqPushSink;
