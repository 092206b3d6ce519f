//! Message Handler for server-side message processing
//!
//! 订阅 client_tx，排空并记录客户端的入站消息。
//! 失效信号端点是单向推送的：客户端发来的业务帧没有服务端语义，
//! 只记日志后丢弃，客户端的所有读写操作都走 HTTP API。

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Server-side message handler
///
/// Runs in the background, draining messages published to the
/// client→server channel.
pub struct MessageHandler {
    receiver: broadcast::Receiver<BusMessage>,
    shutdown_token: CancellationToken,
}

impl MessageHandler {
    /// Create a new message handler
    pub fn new(receiver: broadcast::Receiver<BusMessage>, shutdown_token: CancellationToken) -> Self {
        Self {
            receiver,
            shutdown_token,
        }
    }

    /// Run the handler loop until shutdown
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::debug!("Message handler shutting down");
                    break;
                }

                msg_result = self.receiver.recv() => {
                    match msg_result {
                        Ok(msg) => {
                            tracing::debug!(
                                source = ?msg.source,
                                event_type = %msg.event_type,
                                payload_len = msg.payload.len(),
                                "Received client message (ignored; push-only endpoint)"
                            );
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(dropped_messages = n, "Message handler lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::debug!("Client message channel closed");
                            break;
                        }
                    }
                }
            }
        }
    }
}
