use crate::core::Config;
use crate::message::{MessageBus, MessageHandler, TransportConfig};
use std::sync::Arc;

/// 消息总线服务
///
/// 封装 MessageBus，提供：
/// - TCP 服务器启动
/// - 后台消息处理器
/// - 生命周期管理
#[derive(Clone, Debug)]
pub struct MessageBusService {
    /// 消息总线实例
    bus: Arc<MessageBus>,
    /// TCP 监听端口
    tcp_port: u16,
}

impl MessageBusService {
    /// 创建消息总线服务
    pub fn new(config: &Config) -> Self {
        let transport_config = TransportConfig {
            tcp_listen_addr: format!("0.0.0.0:{}", config.message_tcp_port),
            channel_capacity: 1024,
        };

        Self {
            bus: Arc::new(MessageBus::from_config(transport_config)),
            tcp_port: config.message_tcp_port,
        }
    }

    /// 获取消息总线引用
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// 启动 TCP 服务器
    pub async fn start_tcp_server(&self) -> Result<(), crate::utils::AppError> {
        tracing::debug!(port = self.tcp_port, "Starting Message Bus TCP server");
        self.bus.start_tcp_server().await
    }

    /// 启动后台消息处理器
    ///
    /// MessageHandler 订阅 client_tx，排空来自客户端的入站消息
    pub fn start_background_tasks(&self) {
        let handler = MessageHandler::new(
            self.bus.subscribe_to_clients(),
            self.bus.shutdown_token().clone(),
        );

        tokio::spawn(async move {
            handler.run().await;
        });

        tracing::debug!("Message handler started in background");
    }
}
