//! # Bridge Binary
//!
//! ```text
//! bridge <config.toml>
//! ```
//!
//! Exit codes: 0 after a signal-initiated shutdown, 1 on a usage error, a
//! startup failure or a fatal queue record.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};

use bridge_runtime::{BridgeConfig, BridgeContext, ShutdownSignal};
use bridge_sync::BridgeApi;
use bridge_telemetry::init_logging;

/// Keeps the worker cache in sync with the control-plane queue.
#[derive(Debug, Parser)]
#[command(name = "bridge", version)]
struct Args {
    /// Path to the TOML configuration file
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Bridge stopped");
            eprintln!("bridge: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut shutdown = ShutdownSignal::install();

    let config = BridgeConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    init_logging(&config.telemetry()).context("installing log subscriber")?;
    let codec = config.codec()?;

    let context = match shutdown.guard(BridgeContext::connect(&config)).await {
        Ok(context) => context?,
        Err(signal) => {
            info!(signal, "Shutdown requested while connecting");
            return Ok(());
        }
    };
    let bridge = context.bridge(&config, codec);

    let outcome = match shutdown
        .guard(async {
            bridge.reconcile_buffers().await;
            bridge.run_forever().await
        })
        .await
    {
        Ok(result) => result.context("queue watcher stopped"),
        Err(signal) => {
            info!(signal, "Shutdown requested");
            Ok(())
        }
    };

    drop(bridge);
    context.close().await;
    outcome
}
