//! 消息总线核心实现
//!
//! # 消息流
//!
//! ```text
//! Server ──▶ publish() ──────▶ server_tx ──▶ Connected Clients
//! Client ──▶ (TCP frame) ────▶ client_tx ──▶ MessageHandler (log & drop)
//! ```
//!
//! MessageBus 同时充当连接注册表：客户端在 TCP accept/断开时
//! 注册和移除，broadcast 即 publish，生命周期由 shutdown token
//! 绑定到进程启停。

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::ConnectedClient;
use super::transport::{MemoryTransport, Transport};
use crate::utils::AppError;

/// Configuration for transport layer
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tcp_listen_addr: String,
    /// Capacity of the broadcast channel (default: 1024)
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tcp_listen_addr: "0.0.0.0:4001".to_string(),
            channel_capacity: 1024,
        }
    }
}

/// 消息总线 - 负责消息路由和连接管理
///
/// # 职责
///
/// - 广播 (publish)
/// - 客户端注册表 (connect 时插入, disconnect 时移除)
/// - 传输层抽象 (TCP/Memory)
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 客户端到服务器的消息通道
    client_tx: broadcast::Sender<BusMessage>,
    /// 服务器到客户端的广播通道
    server_tx: broadcast::Sender<BusMessage>,
    /// 传输层配置
    pub(crate) config: TransportConfig,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
    /// 已连接的客户端 (Client ID -> Transport)
    pub(crate) clients: Arc<DashMap<String, Arc<dyn Transport>>>,
}

impl MessageBus {
    /// 创建默认配置的消息总线
    pub fn new() -> Self {
        Self::from_config(TransportConfig::default())
    }

    /// 从配置创建消息总线
    pub fn from_config(config: TransportConfig) -> Self {
        let capacity = config.channel_capacity;
        let (client_tx, _) = broadcast::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            client_tx,
            server_tx,
            config,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// 发布消息 (服务器 -> 所有订阅者)
    ///
    /// 用于广播失效信号到所有连接的客户端
    pub async fn publish(&self, msg: BusMessage) -> Result<(), AppError> {
        self.server_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(())
    }

    /// 订阅客户端消息 (服务器专用)
    ///
    /// MessageHandler 使用此方法接收来自客户端的入站消息
    pub fn subscribe_to_clients(&self) -> broadcast::Receiver<BusMessage> {
        self.client_tx.subscribe()
    }

    /// 订阅服务器广播 (客户端专用)
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// 获取内存传输层 (同进程通信)
    ///
    /// 用于测试或同进程客户端
    pub fn memory_transport(&self) -> MemoryTransport {
        MemoryTransport::new(&self.server_tx)
    }

    /// 获取客户端内存传输层 (可发送消息到服务器)
    pub fn client_memory_transport(&self) -> MemoryTransport {
        MemoryTransport::with_client_sender(&self.server_tx, &self.client_tx)
    }

    /// 获取客户端发送端 (client→server 通道)
    pub fn sender_to_server(&self) -> &broadcast::Sender<BusMessage> {
        &self.client_tx
    }

    /// 获取广播发送端 (高级用法)
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 获取已连接客户端列表
    pub fn get_connected_clients(&self) -> Vec<ConnectedClient> {
        self.clients
            .iter()
            .map(|entry| ConnectedClient {
                id: entry.key().clone(),
                addr: entry.value().peer_addr(),
            })
            .collect()
    }

    /// 优雅关闭消息总线
    ///
    /// 取消所有运行中的任务，包括 TCP 服务器
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
