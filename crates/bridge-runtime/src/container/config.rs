//! # Bridge Configuration
//!
//! TOML configuration file with environment overrides for secrets.
//!
//! ## Config File Format
//!
//! ```toml
//! [cache]
//! host = "127.0.0.1"
//! port = 6379
//! db = 0
//! password = "secret"
//!
//! [store]
//! host = "127.0.0.1"
//! port = 5432
//! user = "bridge"
//! auth_key = "secret"
//! database = "monitors"
//! queue_table = "dc1queue"
//!
//! [sink]
//! host = "127.0.0.1"
//! port = 5555
//!
//! [bridge]
//! poll_interval_secs = 10
//! crypto_key = "<Fernet key: urlsafe base64, 32 bytes>"
//! env_name = "production"
//! metrics_key = "ez-metrics"
//! codec_failure_policy = "skip_record"
//! use_syslog = true
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BRIDGE_CRYPTO_KEY` | `bridge.crypto_key` |
//! | `BRIDGE_CACHE_PASSWORD` | `cache.password` |
//! | `BRIDGE_STORE_AUTH_KEY` | `store.auth_key` |
//! | `BRIDGE_POLL_INTERVAL_SECS` | `bridge.poll_interval_secs` |

use std::fs;
use std::path::Path;
use std::time::Duration;

use bridge_crypto::{CodecError, PayloadCodec};
use bridge_sync::{BridgeSettings, CodecFailurePolicy};
use bridge_telemetry::TelemetryConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::is_valid_identifier;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Cannot parse config file: {0}")]
    Parse(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidOverride { var: &'static str, reason: String },

    #[error("Poll interval must be at least one second")]
    ZeroPollInterval,

    #[error("Queue table {0:?} is not a plain SQL identifier")]
    InvalidQueueTable(String),

    #[error("Invalid crypto key: {0}")]
    InvalidCryptoKey(#[from] CodecError),
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    pub bridge: BridgeSection,
}

/// Redis connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: None,
        }
    }
}

/// Postgres connection and queue table.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default = "default_store_user")]
    pub user: String,
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default = "default_store_database")]
    pub database: String,
    pub queue_table: String,
}

fn default_store_host() -> String {
    "127.0.0.1".to_string()
}

fn default_store_port() -> u16 {
    5432
}

fn default_store_user() -> String {
    "bridge".to_string()
}

fn default_store_database() -> String {
    "monitors".to_string()
}

/// ZMTP PULL endpoint receiving manual checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5555,
        }
    }
}

impl SinkConfig {
    /// `tcp://host:port` endpoint the PUSH socket connects to.
    pub fn endpoint(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }
}

/// Bridge behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeSection {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    pub crypto_key: String,
    #[serde(default = "default_env_name")]
    pub env_name: String,
    #[serde(default)]
    pub metrics_key: String,
    /// Defaults to the queue table name.
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(default)]
    pub codec_failure_policy: CodecFailurePolicy,
    #[serde(default)]
    pub use_syslog: bool,
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_env_name() -> String {
    "production".to_string()
}

impl BridgeConfig {
    /// Read, override from the process environment and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from `lookup`, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("BRIDGE_CRYPTO_KEY") {
            self.bridge.crypto_key = key;
        }
        if let Some(password) = lookup("BRIDGE_CACHE_PASSWORD") {
            self.cache.password = Some(password);
        }
        if let Some(auth_key) = lookup("BRIDGE_STORE_AUTH_KEY") {
            self.store.auth_key = Some(auth_key);
        }
        if let Some(secs) = lookup("BRIDGE_POLL_INTERVAL_SECS") {
            self.bridge.poll_interval_secs = secs.trim().parse().map_err(
                |e: std::num::ParseIntError| ConfigError::InvalidOverride {
                    var: "BRIDGE_POLL_INTERVAL_SECS",
                    reason: e.to_string(),
                },
            )?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if !is_valid_identifier(&self.store.queue_table) {
            return Err(ConfigError::InvalidQueueTable(self.store.queue_table.clone()));
        }
        self.codec()?;
        Ok(())
    }

    pub fn codec(&self) -> Result<PayloadCodec, ConfigError> {
        Ok(PayloadCodec::new(&self.bridge.crypto_key)?)
    }

    /// Deployment identifier used for monitor locality.
    pub fn datacenter(&self) -> &str {
        self.bridge
            .datacenter
            .as_deref()
            .unwrap_or(&self.store.queue_table)
    }

    pub fn settings(&self) -> BridgeSettings {
        BridgeSettings {
            queue_table: self.store.queue_table.clone(),
            datacenter: self.datacenter().to_string(),
            poll_interval: Duration::from_secs(self.bridge.poll_interval_secs),
            env_name: self.bridge.env_name.clone(),
            metrics_key: self.bridge.metrics_key.clone(),
            codec_failure_policy: self.bridge.codec_failure_policy,
        }
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig::from_env()
            .with_syslog(self.bridge.use_syslog)
            .with_env_name(self.bridge.env_name.clone())
    }
}
