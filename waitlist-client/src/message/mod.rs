// waitlist-client/src/message/mod.rs
// 消息模块 - 失效信号订阅客户端和错误类型

pub mod client;
pub mod transport;

pub use client::MessageClient;
pub use shared::message::{BusMessage, EventType};

use thiserror::Error;

/// 消息客户端错误
#[derive(Debug, Error)]
pub enum MessageError {
    /// 连接失败/已断开
    #[error("Connection error: {0}")]
    Connection(String),

    /// 底层 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 协议帧不合法
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// 握手被服务端拒绝
    #[error("Handshake rejected: {0}")]
    HandshakeRejected(String),
}
