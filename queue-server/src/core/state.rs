use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::notify::{self, SmsSender};
use crate::queueing::QueueEngine;
use crate::realtime::LiveEventBus;
use crate::scheduler::NotificationScheduler;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | events | Arc<LiveEventBus> | 实时广播总线 |
/// | sms | Arc<dyn SmsSender> | 短信通道 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 实时广播总线
    pub events: Arc<LiveEventBus>,
    /// 短信通道
    pub sms: Arc<dyn SmsSender>,
}

impl ServerState {
    /// 手动构造（测试中可注入记录型的 sms/bus）
    pub fn with_parts(
        config: Config,
        db: Surreal<Db>,
        events: Arc<LiveEventBus>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            config,
            db,
            events,
            sms,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/queueup.db)
    /// 3. 广播总线和短信通道
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = format!("{}/queueup.db", config.database_dir());
        let db_service = DbService::new(&db_path)
            .await
            .expect("Failed to initialize database");

        let events = Arc::new(LiveEventBus::new());
        let sms = notify::sender_from_config(config);

        Self::with_parts(config.clone(), db_service.db, events, sms)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 排队引擎（轻量，按需构造）
    pub fn engine(&self) -> QueueEngine {
        QueueEngine::new(self.db.clone(), self.sms.clone(), self.events.clone())
    }

    /// 通知调度器
    pub fn scheduler(&self) -> NotificationScheduler {
        NotificationScheduler::new(self.db.clone(), self.sms.clone(), &self.config)
    }
}
