//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 引擎)：表定义 + 仓储层。

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database under the given directory
    /// and select the waitlist namespace/database.
    pub async fn new(db_dir: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_dir)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

        db.use_ns("waitlist")
            .use_db("waitlist")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

        // 表是 schemaless 的，只定义排序/统计用到的索引
        db.query(
            "DEFINE TABLE IF NOT EXISTS queue_entry SCHEMALESS;
             DEFINE INDEX IF NOT EXISTS queue_entry_position ON queue_entry FIELDS position;
             DEFINE INDEX IF NOT EXISTS queue_entry_status ON queue_entry FIELDS status;",
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;

        tracing::info!("Database ready at {}", db_dir.display());

        Ok(Self { db })
    }
}
