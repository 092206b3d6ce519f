//! Queue Entry Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{QueueEntry, QueueEntryCreate};
use shared::models::QueueStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// 每桌预计等待分钟数 (position × 此常数 = estimated_wait_time)
pub const WAIT_MINUTES_PER_PARTY: i32 = 15;

#[derive(Clone)]
pub struct QueueEntryRepository {
    base: BaseRepository,
}

impl QueueEntryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all entries, ordered by position ascending
    pub async fn find_all(&self) -> RepoResult<Vec<QueueEntry>> {
        let entries: Vec<QueueEntry> = self
            .base
            .db()
            .query("SELECT * FROM queue_entry ORDER BY position ASC")
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Find entry by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<QueueEntry>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let entry: Option<QueueEntry> = self.base.db().select(thing).await?;
        Ok(entry)
    }

    /// Count entries currently waiting
    pub async fn count_waiting(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM queue_entry WHERE status = 'WAITING' GROUP ALL")
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Create a new queue entry
    ///
    /// position = 当前 waiting 数量 + 1，estimated_wait_time = position × 15。
    /// 计数和创建在同一个事务里执行，并发入队不会拿到相同的 position。
    /// 已分配的 position 此后不再变化。
    pub async fn create(&self, data: QueueEntryCreate) -> RepoResult<QueueEntry> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $waiting = (SELECT count() FROM queue_entry WHERE status = 'WAITING' GROUP ALL)[0].count OR 0;
                LET $position = $waiting + 1;
                CREATE queue_entry CONTENT {
                    customer_name: $customer_name,
                    phone_number: $phone_number,
                    party_size: $party_size,
                    status: 'WAITING',
                    position: $position,
                    estimated_wait_time: $position * $minutes_per_party,
                    created_at: $created_at
                } RETURN AFTER;
                COMMIT TRANSACTION;
            "#,
            )
            .bind(("customer_name", data.customer_name))
            .bind(("phone_number", data.phone_number))
            .bind(("party_size", data.party_size))
            .bind(("minutes_per_party", WAIT_MINUTES_PER_PARTY))
            .bind(("created_at", shared::util::now_millis()))
            .await?;

        let entries: Vec<QueueEntry> = result.take(0)?;
        entries
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create queue entry".to_string()))
    }

    /// Update the status of an entry
    ///
    /// 只改 status；position 和 estimated_wait_time 保持入队时的值。
    /// 返回 None 表示记录不存在（不报错，由调用方决定语义）。
    pub async fn update_status(
        &self,
        id: &str,
        status: QueueStatus,
    ) -> RepoResult<Option<QueueEntry>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status RETURN AFTER")
            .bind(("thing", thing))
            .bind(("status", status))
            .await?;
        let entries: Vec<QueueEntry> = result.take(0)?;
        Ok(entries.into_iter().next())
    }

    /// Delete an entry, returning the deleted record
    ///
    /// 返回 None 表示记录不存在。不会重排其他记录的 position。
    pub async fn delete(&self, id: &str) -> RepoResult<Option<QueueEntry>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let deleted: Option<QueueEntry> = self.base.db().delete(thing).await?;
        Ok(deleted)
    }
}
