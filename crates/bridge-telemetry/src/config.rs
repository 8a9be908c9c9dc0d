//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for the logging stack.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit journal-friendly lines on stdout (JSON, no ANSI, no timestamp)
    /// for journald or a syslog shipper to collect
    pub use_syslog: bool,

    /// Emit JSON lines with timestamps
    pub json_logs: bool,

    /// Deployment environment name
    pub env_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "monitor-bridge".to_string(),
            log_level: "info".to_string(),
            use_syslog: false,
            json_logs: false,
            env_name: "development".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BRIDGE_SERVICE_NAME`: Service name (default: monitor-bridge)
    /// - `BRIDGE_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `BRIDGE_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("BRIDGE_SERVICE_NAME")
                .unwrap_or_else(|_| "monitor-bridge".to_string()),

            log_level: env::var("BRIDGE_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            use_syslog: false,

            json_logs: env::var("BRIDGE_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            env_name: "development".to_string(),
        }
    }

    #[must_use]
    pub fn with_syslog(mut self, use_syslog: bool) -> Self {
        self.use_syslog = use_syslog;
        self
    }

    #[must_use]
    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = env_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "monitor-bridge");
        assert_eq!(config.log_level, "info");
        assert!(!config.use_syslog);
    }

    #[test]
    fn test_builders() {
        let config = TelemetryConfig::default()
            .with_syslog(true)
            .with_env_name("prod");
        assert!(config.use_syslog);
        assert_eq!(config.env_name, "prod");
    }
}
