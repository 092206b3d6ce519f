//! 服务模块
//!
//! - [`HttpService`] - HTTP API 服务 (路由组装 + 启动)
//! - [`MessageBusService`] - 消息总线服务 (TCP 服务器 + 后台处理器)

pub mod http;
pub mod message_bus;

pub use http::HttpService;
pub use message_bus::MessageBusService;
