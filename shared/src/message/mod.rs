//! 消息总线消息类型定义
//!
//! 这些类型在 waitlist-server 和 clients 之间共享，用于
//! 进程内（内存）和网络（TCP）通信。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 协议版本号
pub const PROTOCOL_VERSION: u16 = 1;

/// 消息总线事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 握手消息
    Handshake = 0,
    /// 同步信号 (资源变更通知)
    Sync = 1,
    /// 请求响应
    Response = 2,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventType::Handshake),
            1 => Ok(EventType::Sync),
            2 => Ok(EventType::Response),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::Sync => write!(f, "sync"),
            EventType::Response => write!(f, "response"),
        }
    }
}

/// 消息总线消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub source: Option<String>,
    pub correlation_id: Option<Uuid>,
    pub target: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            source: None,
            correlation_id: None,
            target: None,
            payload,
        }
    }

    /// 设置目标客户端 (单播)
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    /// 设置关联 ID (用于响应关联请求)
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// 创建握手消息
    pub fn handshake(payload: &HandshakePayload) -> Self {
        Self::new(
            EventType::Handshake,
            serde_json::to_vec(payload).expect("Failed to serialize handshake payload"),
        )
    }

    /// 创建同步信号消息
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            serde_json::to_vec(payload).expect("Failed to serialize sync payload"),
        )
    }

    /// 创建响应消息
    pub fn response(payload: &ResponsePayload) -> Self {
        Self::new(
            EventType::Response,
            serde_json::to_vec(payload).expect("Failed to serialize response payload"),
        )
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_message_roundtrip() {
        let payload = SyncPayload {
            resource: "queue_entry".to_string(),
            version: 3,
            action: "created".to_string(),
            id: "queue_entry:abc".to_string(),
            data: None,
        };

        let msg = BusMessage::sync(&payload);
        assert_eq!(msg.event_type, EventType::Sync);
        assert!(!msg.request_id.is_nil());

        let parsed: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_handshake_message() {
        let payload = HandshakePayload {
            version: PROTOCOL_VERSION,
            client_name: Some("test-client".to_string()),
            client_version: Some("0.1.0".to_string()),
            client_id: None,
        };

        let msg = BusMessage::handshake(&payload);
        assert_eq!(msg.event_type, EventType::Handshake);

        let parsed: HandshakePayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_event_type_byte_mapping() {
        for ty in [EventType::Handshake, EventType::Sync, EventType::Response] {
            assert_eq!(EventType::try_from(ty as u8), Ok(ty));
        }
        assert!(EventType::try_from(200).is_err());
    }

    #[test]
    fn test_response_correlation() {
        let request_id = Uuid::new_v4();
        let response = BusMessage::response(&ResponsePayload::success("ok", None))
            .with_correlation_id(request_id);
        assert_eq!(response.correlation_id, Some(request_id));
    }
}
