use serde::{Deserialize, Serialize};

/// 握手载荷 (客户端 -> 服务端)
///
/// 包含客户端的协议版本信息，用于服务端进行版本校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// 协议版本
    pub version: u16,
    /// 客户端名称/标识
    pub client_name: Option<String>,
    /// 客户端版本
    pub client_version: Option<String>,
    /// 客户端唯一标识 (UUID)
    pub client_id: Option<String>,
}

/// 同步信号载荷 (服务端 -> 所有客户端)
///
/// 当某个资源发生变更时（由某个客户端请求触发），服务端广播此信号，
/// 通知所有连接的客户端刷新数据。信号是尽力而为的失效通知：
/// 客户端收到后重新拉取，丢失或重复都由下一次拉取兜底。
///
/// # 示例
/// - `resource`: "queue_entry"
/// - `version`: 42
/// - `action`: "updated"
/// - `id`: "queue_entry:abc"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型
    pub resource: String,
    /// 版本号 (每次变更递增，客户端可据此判断数据新旧)
    pub version: u64,
    /// 变更类型 (例如: "created", "updated", "deleted")
    pub action: String,
    /// 资源 ID
    pub id: String,
    /// 资源数据 (可选，deleted 时为 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// 通用响应载荷 (服务端 -> 客户端)
///
/// 用于响应握手等请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// 是否成功
    pub success: bool,
    /// 响应消息/错误描述
    pub message: String,
    /// 响应数据 (可选)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// 错误代码 (可选, 仅在失败时有用)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

// ==================== Convenience Constructors ====================

impl ResponsePayload {
    pub fn success(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error_code: None,
        }
    }

    pub fn error(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error_code: code,
        }
    }
}
