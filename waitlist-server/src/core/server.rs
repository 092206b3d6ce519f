//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for sharing with in-process clients)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        // Create application state if not provided
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Start background tasks
        state.start_background_tasks();

        // Start Message Bus TCP Server (plain TCP, push-only fan-out endpoint)
        let message_bus_service = state.message_bus.clone();
        tokio::spawn(async move {
            if let Err(e) = message_bus_service.start_tcp_server().await {
                tracing::error!("Message Bus TCP server failed: {}", e);
            }
        });

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("🍽️ Waitlist Server listening on {}", addr);
        tracing::info!(
            "  Message Bus  : tcp://0.0.0.0:{}",
            self.config.message_tcp_port
        );

        // Graceful shutdown: ctrl-c 取消消息总线并排空 HTTP 连接
        let bus_for_shutdown = state.message_bus().clone();
        let shutdown = async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            bus_for_shutdown.shutdown();
        };

        state
            .http
            .start_server(shutdown)
            .await
            .map_err(|e| crate::core::ServerError::Internal(e.into()))?;

        Ok(())
    }
}
