//! Message Client
//!
//! 失效信号订阅客户端。服务端的消息总线是单向推送的：
//! 客户端连接、握手，然后只接收广播 (主要是 `Sync` 信号)。

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::message::MessageError;
use crate::message::transport::{MemoryTransport, TcpTransport, Transport};
use shared::message::{BusMessage, EventType, HandshakePayload, PROTOCOL_VERSION, ResponsePayload};

/// 广播通道容量 (掉队的订阅者会丢消息，由下一次拉取兜底)
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Push-only message bus subscriber
#[derive(Debug, Clone)]
pub struct MessageClient {
    transport: Arc<dyn Transport>,
    event_tx: broadcast::Sender<BusMessage>,
    client_id: Option<String>,
}

impl MessageClient {
    /// Connect via TCP and perform the protocol handshake
    pub async fn connect(addr: &str, client_name: &str) -> Result<Self, MessageError> {
        let transport: Arc<dyn Transport> = Arc::new(TcpTransport::connect(addr).await?);

        // 🤝 Perform Handshake
        let payload = HandshakePayload {
            version: PROTOCOL_VERSION,
            client_name: Some(client_name.to_string()),
            client_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            client_id: None, // Let server generate
        };
        let handshake = BusMessage::handshake(&payload);
        transport.write_message(&handshake).await?;

        // Wait for the server's ack before spawning the receive loop
        let ack = transport.read_message().await?;
        if ack.event_type != EventType::Response
            || ack.correlation_id != Some(handshake.request_id)
        {
            return Err(MessageError::InvalidMessage(format!(
                "Expected handshake response, got {}",
                ack.event_type
            )));
        }

        let response: ResponsePayload = ack
            .parse_payload()
            .map_err(|e| MessageError::InvalidMessage(format!("Invalid handshake ack: {}", e)))?;
        if !response.success {
            return Err(MessageError::HandshakeRejected(response.message));
        }

        let client_id = response
            .data
            .as_ref()
            .and_then(|d| d.get("client_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        tracing::debug!(client_id = ?client_id, "Connected to message bus at {}", addr);

        Ok(Self::spawn(transport, client_id))
    }

    /// Create an in-process client wired directly to the server's channels
    ///
    /// 同进程模式不经过 TCP 握手，用于测试和内嵌场景。
    pub fn memory(
        server_broadcast_tx: &broadcast::Sender<BusMessage>,
        client_to_server_tx: &broadcast::Sender<BusMessage>,
    ) -> Self {
        let transport: Arc<dyn Transport> =
            Arc::new(MemoryTransport::new(server_broadcast_tx, client_to_server_tx));
        Self::spawn(transport, None)
    }

    /// Spawn the background receive loop and build the client
    fn spawn(transport: Arc<dyn Transport>, client_id: Option<String>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let loop_transport = transport.clone();
        let loop_tx = event_tx.clone();
        tokio::spawn(async move {
            loop {
                match loop_transport.read_message().await {
                    Ok(msg) => {
                        if let Err(e) = loop_tx.send(msg) {
                            tracing::debug!("No subscribers for event: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Transport read stopped: {}", e);
                        // 连接断开，客户端需重新 connect
                        break;
                    }
                }
            }
        });

        Self {
            transport,
            event_tx,
            client_id,
        }
    }

    /// Subscribe to server broadcasts
    ///
    /// Returns a receiver of all messages pushed by the server
    /// (primarily `Sync` invalidation signals).
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.event_tx.subscribe()
    }

    /// Server-assigned client id (None for in-process clients)
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Send a message to the server
    ///
    /// 服务端会记录并丢弃业务帧；保留此方法用于诊断。
    pub async fn send(&self, msg: &BusMessage) -> Result<(), MessageError> {
        self.transport.write_message(msg).await
    }

    /// Close the client connection
    pub async fn close(&self) -> Result<(), MessageError> {
        self.transport.close().await
    }
}
