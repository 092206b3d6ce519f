//! Waitlist Server - 餐厅等位管理服务
//!
//! # 架构概述
//!
//! 本模块是 Waitlist Server 的主入口，提供以下核心功能：
//!
//! - **消息总线** (`message`): 支持 TCP/Memory 传输的实时失效信号广播
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储等位记录
//! - **HTTP API** (`api`): 等位队列的查询与变更接口
//!
//! # 模块结构
//!
//! ```text
//! waitlist-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── message/       # 消息总线 (失效信号 fan-out)
//! ├── services/      # HTTP 服务、消息总线服务
//! └── utils/         # 错误、日志、校验工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod message;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::message::{BusMessage, EventType, MessageBus};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env 并初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在不是错误
    let _ = dotenv::dotenv();
    init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
 _       __      _ __  ___      __
| |     / /___ _(_) /_/ (_)____/ /_
| | /| / / __ `/ / __/ / / ___/ __/
| |/ |/ / /_/ / / /_/ / (__  ) /_
|__/|__/\__,_/_/\__/_/_/____/\__/
    "#
    );
}
