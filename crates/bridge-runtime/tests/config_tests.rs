//! # Configuration Tests
//!
//! Loading the TOML file, defaults, environment overrides and validation.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use bridge_runtime::{BridgeConfig, ConfigError};
use bridge_sync::CodecFailurePolicy;
use tempfile::NamedTempFile;

// Urlsafe alphabet, as emitted by the control plane.
const KEY: &str = "yMnKy8zNzs_Q0dLT1NXW19jZ2tvc3d7f4OHi4-Tl5uc=";

fn minimal() -> String {
    format!(
        r#"
[store]
queue_table = "dc1queue"

[bridge]
crypto_key = "{KEY}"
"#
    )
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_file_settings() {
    let mut config = BridgeConfig::from_toml_str(&format!(
        r#"
[cache]
host = "cache.internal"
port = 6380
db = 2
password = "cache-secret"

[store]
host = "db.internal"
port = 5433
user = "bridge"
auth_key = "store-secret"
database = "monitoring"
queue_table = "dc2queue"

[sink]
host = "sink.internal"
port = 7000

[bridge]
poll_interval_secs = 3
crypto_key = "{KEY}"
env_name = "staging"
metrics_key = "ez-metrics"
datacenter = "eu-west"
codec_failure_policy = "abort_cycle"
use_syslog = true
"#
    ))
    .unwrap();
    config.apply_overrides(|_| None).unwrap();
    config.validate().unwrap();

    assert_eq!(config.cache.db, 2);
    assert_eq!(config.cache.password.as_deref(), Some("cache-secret"));
    assert_eq!(config.store.auth_key.as_deref(), Some("store-secret"));
    assert_eq!(config.store.database, "monitoring");
    assert_eq!(config.sink.endpoint(), "tcp://sink.internal:7000");

    let settings = config.settings();
    assert_eq!(settings.queue_table, "dc2queue");
    assert_eq!(settings.datacenter, "eu-west");
    assert_eq!(settings.poll_interval, Duration::from_secs(3));
    assert_eq!(settings.codec_failure_policy, CodecFailurePolicy::AbortCycle);
    assert!(config.telemetry().use_syslog);
    assert_eq!(config.telemetry().env_name, "staging");
}

#[test]
fn test_defaults_and_datacenter_fallback() {
    let config = BridgeConfig::from_toml_str(&minimal()).unwrap();

    assert_eq!(config.cache.port, 6379);
    assert_eq!(config.store.port, 5432);
    assert_eq!(config.bridge.poll_interval_secs, 10);
    assert_eq!(config.datacenter(), "dc1queue");
    assert_eq!(config.settings().codec_failure_policy, CodecFailurePolicy::SkipRecord);
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_overrides() {
    let mut config = BridgeConfig::from_toml_str(&minimal()).unwrap();
    let env: HashMap<&str, &str> = HashMap::from([
        ("BRIDGE_CACHE_PASSWORD", "from-env"),
        ("BRIDGE_STORE_AUTH_KEY", "pg-from-env"),
        ("BRIDGE_POLL_INTERVAL_SECS", " 30 "),
    ]);

    config
        .apply_overrides(|var| env.get(var).map(|v| v.to_string()))
        .unwrap();

    assert_eq!(config.cache.password.as_deref(), Some("from-env"));
    assert_eq!(config.store.auth_key.as_deref(), Some("pg-from-env"));
    assert_eq!(config.bridge.poll_interval_secs, 30);
    assert_eq!(config.bridge.crypto_key, KEY);
}

#[test]
fn test_invalid_interval_override() {
    let mut config = BridgeConfig::from_toml_str(&minimal()).unwrap();

    let result = config.apply_overrides(|var| {
        (var == "BRIDGE_POLL_INTERVAL_SECS").then(|| "soon".to_string())
    });

    assert!(matches!(
        result,
        Err(ConfigError::InvalidOverride { var: "BRIDGE_POLL_INTERVAL_SECS", .. })
    ));
}

#[test]
fn test_validation_failures() {
    let mut config = BridgeConfig::from_toml_str(&minimal()).unwrap();
    config.bridge.poll_interval_secs = 0;
    assert!(matches!(config.validate(), Err(ConfigError::ZeroPollInterval)));

    let mut config = BridgeConfig::from_toml_str(&minimal()).unwrap();
    config.store.queue_table = "queue; DROP TABLE monitors".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidQueueTable(_))));

    let mut config = BridgeConfig::from_toml_str(&minimal()).unwrap();
    config.bridge.crypto_key = "c2hvcnQ=".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidCryptoKey(_))));
}

#[test]
fn test_missing_and_unparseable_files() {
    let missing = std::env::temp_dir().join("bridge-config-that-does-not-exist.toml");
    assert!(matches!(
        BridgeConfig::load(&missing),
        Err(ConfigError::Read { .. })
    ));

    let file = write_config("[store]\nqueue_table = 5\n");
    assert!(matches!(
        BridgeConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_unknown_codec_policy_rejected() {
    let raw = minimal().replace(
        "[bridge]\n",
        "[bridge]\ncodec_failure_policy = \"ignore\"\n",
    );

    assert!(matches!(
        BridgeConfig::from_toml_str(&raw),
        Err(ConfigError::Parse(_))
    ));
}
