//! 消息总线模块 - 失效信号 fan-out
//!
//! 每次成功的变更操作之后，服务端向所有已连接的视图客户端广播一条
//! `Sync` 信号；客户端收到后重新拉取数据。信号是尽力而为的：
//! 不确认、不重试、不保证顺序，丢失或重复都由客户端的下一次拉取兜底。
//!
//! ```text
//!         ┌────────────────────┐
//!         │   Transport Trait  │  ◄── 可插拔接口
//!         └────────┬───────────┘
//!                  │
//!          ┌───────┴───────┐
//!          ▼               ▼
//!     TcpTransport   MemoryTransport
//!     (TCP 协议)     (同进程通信)
//! ```

pub mod bus;
pub mod handler;
pub mod tcp_server;
pub mod transport;

pub use bus::{MessageBus, TransportConfig};
pub use handler::MessageHandler;
pub use shared::message::{BusMessage, EventType, HandshakePayload, SyncPayload};

/// 已连接客户端的描述信息 (用于诊断)
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    /// 客户端 ID (握手时协商)
    pub id: String,
    /// 对端地址
    pub addr: Option<String>,
}
