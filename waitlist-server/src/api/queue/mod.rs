//! Queue API 模块
//!
//! 等位队列的查询与变更接口。公共视图和管理视图共用同一组路由
//! (本服务不做认证，见部署说明)。

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/queue", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/wait-time", get(handler::current_wait_time))
        .route("/{id}", get(handler::get_by_id).delete(handler::remove))
        .route("/{id}/status", put(handler::update_status))
}
