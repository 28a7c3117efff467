//! Queue Server - 小店排队与预约引擎
//!
//! # 架构概述
//!
//! 本模块是排队服务器的主入口，提供以下核心功能：
//!
//! - **排队引擎** (`queueing`): 入队、队列号分配、位置计算、状态流转
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **实时广播** (`realtime`): 队列看板的事件扇出
//! - **通知** (`notify` / `scheduler`): 短信通道和定时提醒
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! queue-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── queueing/      # 排队引擎
//! ├── realtime/      # 实时广播
//! ├── notify/        # 短信通道和消息文案
//! ├── scheduler/     # 通知调度器
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod notify;
pub mod queueing;
pub mod realtime;
pub mod scheduler;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use queueing::QueueEngine;
pub use realtime::{EventSink, LiveEvent, LiveEventBus};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ____
  / __ \__  _____  __  _____  __  ______
 / / / / / / / _ \/ / / / _ \/ / / / __ \
/ /_/ / /_/ /  __/ /_/ /  __/ /_/ / /_/ /
\___\_\__,_/\___/\__,_/\___/\__,_/ .___/
                                /_/
    "#
    );
}
