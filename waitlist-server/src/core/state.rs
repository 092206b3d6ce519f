use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{BusMessage, SyncPayload};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::{Config, ServerError};
use crate::db::DbService;
use crate::services::{HttpService, MessageBusService};

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// # 使用场景
///
/// 用于 broadcast_sync 时自动生成递增的版本号，
/// 确保客户端可以通过版本号判断数据新旧。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是等位服务的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | message_bus | MessageBusService | 消息总线服务 |
/// | http | HttpService | HTTP 服务 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 消息总线服务
    pub message_bus: MessageBusService,
    /// HTTP 服务
    pub http: HttpService,
    /// 资源版本管理器 (用于 broadcast_sync 自动递增版本号)
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database)
    /// 3. 各服务 (MessageBus, Http)
    /// 4. HTTP 服务延迟初始化 (需要 state 本身)
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .map_err(|e| ServerError::Database(format!("Failed to create work dir: {}", e)))?;

        // 1. Initialize DB
        let db_service = DbService::new(&config.database_dir())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        // 2. Initialize Services
        let message_bus = MessageBusService::new(config);
        let http = HttpService::new(config.clone());

        let state = Self {
            config: config.clone(),
            db: db_service.db,
            message_bus,
            http: http.clone(),
            resource_versions: Arc::new(ResourceVersions::new()),
        };

        // 3. Late initialization for HttpService (needs state)
        http.initialize(state.clone());

        Ok(state)
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 消息总线处理器 (MessageHandler, 记录并丢弃客户端入站消息)
    pub fn start_background_tasks(&self) {
        self.message_bus.start_background_tasks();
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取消息总线
    pub fn message_bus(&self) -> &Arc<crate::message::MessageBus> {
        self.message_bus.bus()
    }

    /// 获取 HTTP 服务
    pub fn http_service(&self) -> &HttpService {
        &self.http
    }

    /// 广播同步消息
    ///
    /// 向所有连接的客户端广播资源变更通知。
    /// 版本号由 ResourceVersions 自动递增管理。
    /// 发送失败只记录日志，不影响变更操作本身。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "queue_entry")
    /// - `action`: 变更类型 ("created", "updated", "deleted")
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (deleted 时为 None)
    pub async fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        if let Err(e) = self.message_bus().publish(BusMessage::sync(&payload)).await {
            tracing::debug!("Sync broadcast skipped: {}", e);
        }
    }
}
