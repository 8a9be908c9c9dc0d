//! ZMTP PUSH sink: one single-frame compact JSON message per manual check.
//!
//! The socket connects on first send. A failed send drops it, so the next
//! send reconnects. Connecting is bounded by `connect_timeout` because the
//! socket keeps retrying a refused peer on its own.

use std::time::Duration;

use async_trait::async_trait;
use bridge_sync::{SinkError, SinkTransport};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use zeromq::{PushSocket, Socket, SocketSend, ZmqMessage};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ZmqPushSink {
    endpoint: String,
    connect_timeout: Duration,
    socket: Mutex<Option<PushSocket>>,
}

impl ZmqPushSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            socket: Mutex::new(None),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close the socket if one is open.
    pub async fn shutdown(&self) {
        if let Some(socket) = self.socket.lock().await.take() {
            let _ = socket.close().await;
        }
    }

    async fn connect(&self) -> Result<PushSocket, SinkError> {
        let mut socket = PushSocket::new();
        let connected = tokio::time::timeout(self.connect_timeout, socket.connect(&self.endpoint))
            .await
            .map_err(|_| SinkError::Connect {
                addr: self.endpoint.clone(),
                reason: format!("no peer after {:?}", self.connect_timeout),
            })?;
        connected.map_err(|e| SinkError::Connect {
            addr: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        debug!(endpoint = %self.endpoint, "Connected to sink");
        Ok(socket)
    }
}

#[async_trait]
impl SinkTransport for ZmqPushSink {
    async fn send(&self, message: &str) -> Result<(), SinkError> {
        let mut guard = self.socket.lock().await;
        let mut socket = match guard.take() {
            Some(socket) => socket,
            None => self.connect().await?,
        };

        if let Err(e) = socket.send(ZmqMessage::from(message.to_string())).await {
            warn!(endpoint = %self.endpoint, error = %e, "Sink send failed, reconnecting on next send");
            return Err(SinkError::Send(e.to_string()));
        }
        *guard = Some(socket);
        Ok(())
    }
}
