//! # Shutdown Signal
//!
//! Signal handlers are installed once, before anything connects, so a
//! SIGTERM that lands during startup or replay is seen like one that lands
//! while watching the queue.

use std::future::Future;

use tracing::warn;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: Option<Signal>,
    #[cfg(unix)]
    interrupt: Option<Signal>,
}

impl ShutdownSignal {
    /// Install the handlers. A handler that cannot be installed is logged
    /// and never fires.
    pub fn install() -> Self {
        #[cfg(unix)]
        {
            Self {
                terminate: listen(SignalKind::terminate(), "SIGTERM"),
                interrupt: listen(SignalKind::interrupt(), "SIGINT"),
            }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Wait for the next shutdown request and name the signal.
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = next(&mut self.terminate) => "SIGTERM",
                _ = next(&mut self.interrupt) => "SIGINT",
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            "Ctrl-C"
        }
    }

    /// Run `work` until it finishes or a shutdown is requested. Returns
    /// `Err(signal)` when the signal won; `work` is dropped in that case.
    pub async fn guard<F: Future>(&mut self, work: F) -> Result<F::Output, &'static str> {
        tokio::select! {
            biased;
            output = work => Ok(output),
            signal = self.recv() => Err(signal),
        }
    }
}

#[cfg(unix)]
fn listen(kind: SignalKind, name: &'static str) -> Option<Signal> {
    match signal(kind) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!(signal = name, error = %e, "Cannot install signal handler");
            None
        }
    }
}

#[cfg(unix)]
async fn next(stream: &mut Option<Signal>) {
    match stream {
        Some(stream) => {
            stream.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}
