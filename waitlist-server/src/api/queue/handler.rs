//! Queue API Handlers
//!
//! 错误处理约定（与存储失败时的降级行为对应）：
//! - 查询接口吞掉存储错误：记日志，返回 null / 空列表 / 0
//! - 变更接口把存储错误上抛为 500；"记录不存在"返回 null 而不是错误
//! - 每次成功变更之后广播一条 Sync 失效信号

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{QueueEntry, QueueEntryCreate, QueueStatusUpdate};
use crate::db::repository::QueueEntryRepository;
use crate::db::repository::queue_entry::WAIT_MINUTES_PER_PARTY;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_party_size, validate_required_text};

const RESOURCE: &str = "queue_entry";

/// GET /api/queue - 获取所有等位记录 (按 position 升序)
///
/// 存储失败时返回空列表
pub async fn list(State(state): State<ServerState>) -> Json<Vec<QueueEntry>> {
    let repo = QueueEntryRepository::new(state.db.clone());
    match repo.find_all().await {
        Ok(entries) => Json(entries),
        Err(e) => {
            tracing::error!(target: "database", error = %e, "getAllQueues failed, returning empty list");
            Json(Vec::new())
        }
    }
}

/// GET /api/queue/:id - 获取单条等位记录
///
/// 不存在或存储失败时返回 null
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Json<Option<QueueEntry>> {
    let repo = QueueEntryRepository::new(state.db.clone());
    match repo.find_by_id(&id).await {
        Ok(entry) => Json(entry),
        Err(e) => {
            tracing::error!(target: "database", error = %e, "getQueue failed, returning null");
            Json(None)
        }
    }
}

/// GET /api/queue/wait-time - 当前预计等待时间 (分钟)
///
/// waiting 状态的记录数 × 15；存储失败时返回 0
pub async fn current_wait_time(State(state): State<ServerState>) -> Json<i64> {
    let repo = QueueEntryRepository::new(state.db.clone());
    match repo.count_waiting().await {
        Ok(count) => Json(count * WAIT_MINUTES_PER_PARTY as i64),
        Err(e) => {
            tracing::error!(target: "database", error = %e, "getCurrentWaitTime failed, returning 0");
            Json(0)
        }
    }
}

/// POST /api/queue - 入队
///
/// position = 当前 waiting 数 + 1，estimated_wait_time = position × 15，
/// status 固定为 WAITING。存储失败对调用方可见 (500)。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<QueueEntryCreate>,
) -> AppResult<Json<QueueEntry>> {
    validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone_number, "phone_number", MAX_SHORT_TEXT_LEN)?;
    validate_party_size(payload.party_size)?;

    let repo = QueueEntryRepository::new(state.db.clone());
    let entry = repo.create(payload).await?;

    // 广播失效信号
    let id = entry.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    state
        .broadcast_sync(RESOURCE, "created", &id, Some(&entry))
        .await;

    Ok(Json(entry))
}

/// PUT /api/queue/:id/status - 更新等位状态
///
/// 只改 status 字段，不重算任何记录的 position。
/// 记录不存在时返回 null (不广播)。
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<QueueStatusUpdate>,
) -> AppResult<Json<Option<QueueEntry>>> {
    let repo = QueueEntryRepository::new(state.db.clone());
    let updated = repo.update_status(&id, payload.status).await?;

    if let Some(entry) = &updated {
        state
            .broadcast_sync(RESOURCE, "updated", &id, Some(entry))
            .await;
    }

    Ok(Json(updated))
}

/// DELETE /api/queue/:id - 移除等位记录
///
/// 返回被删除的记录；不存在时返回 null (不广播)。
/// 后面记录的 position 不会前移。
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<QueueEntry>>> {
    let repo = QueueEntryRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;

    if deleted.is_some() {
        state
            .broadcast_sync::<()>(RESOURCE, "deleted", &id, None)
            .await;
    }

    Ok(Json(deleted))
}
