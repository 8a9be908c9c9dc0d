//! # Bridge Telemetry
//!
//! Structured logging for the bridge processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env().with_syslog(true);
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BRIDGE_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `BRIDGE_SERVICE_NAME` | `monitor-bridge` | Service name attached to every line |
//! | `BRIDGE_JSON_LOGS` | `false` | Force JSON lines without syslog mode |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LogFormat};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Log a queue-record event with the standard fields.
///
/// # Example
///
/// ```rust,ignore
/// log_queue_event!(debug, "q-17", "Queue entry removed from queue table", deleted = true);
/// ```
#[macro_export]
macro_rules! log_queue_event {
    ($level:ident, $queue_id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            queue_id = %$queue_id,
            $($($field)*,)?
            $msg
        )
    };
}
