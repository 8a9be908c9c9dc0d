//! Subscriber installation.
//!
//! Every format writes to stdout. Three output shapes:
//! - `Pretty`: human-readable lines with ANSI colors, for development
//! - `Json`: JSON lines with timestamps, for log shippers
//! - `Journal`: JSON lines without ANSI or timestamps, selected by
//!   `use_syslog`. Nothing talks to a syslog daemon; journald (or whatever
//!   supervises the process) captures stdout and stamps each line itself.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Output format selected from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    /// Stdout lines shaped for journald or a syslog shipper.
    Journal,
}

impl LogFormat {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        if config.use_syslog {
            LogFormat::Journal
        } else if config.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed or the filter does not parse.
pub fn init_logging(config: &TelemetryConfig) -> Result<LogFormat, TelemetryError> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter(e.to_string()))?;
    let format = LogFormat::from_config(config);

    match format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::Install(e.to_string()))?;
        }
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init()
                .map_err(|e| TelemetryError::Install(e.to_string()))?;
        }
        LogFormat::Journal => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journal_layer(std::io::stdout))
                .try_init()
                .map_err(|e| TelemetryError::Install(e.to_string()))?;
        }
    }

    tracing::info!(
        service = %config.service_name,
        env = %config.env_name,
        format = ?format,
        "Logging initialized"
    );

    Ok(format)
}

fn journal_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
}
