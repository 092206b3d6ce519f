//! Queue Entry Model (database row)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::QueueStatus;
use surrealdb::RecordId;

/// Queue entry entity (等位记录)
///
/// `position` 在入队时一次性分配 (waiting 数量 + 1)，之后永不重排：
/// 前面的客人离队或换状态时，后面记录的 position 保持原值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub customer_name: String,
    pub phone_number: String,
    pub party_size: i32,
    pub status: QueueStatus,
    pub position: i32,
    /// 预计等待分钟数 (position × 每桌常数)
    pub estimated_wait_time: i32,
    /// Unix millis
    pub created_at: i64,
}

/// Join queue payload (入队数据，position/状态由仓储层计算)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntryCreate {
    pub customer_name: String,
    pub phone_number: String,
    pub party_size: i32,
}

/// Update status payload
///
/// 只更新 status 字段；其他字段（包括 position）不受影响。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatusUpdate {
    pub status: QueueStatus,
}
