//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`queue`] - 等位队列查询与变更接口

pub mod health;
pub mod queue;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
