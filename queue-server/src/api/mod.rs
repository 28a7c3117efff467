//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`bookings`] - 预约/排队接口
//! - [`queues`] - 队列管理接口
//! - [`feedback`] - 服务评价接口

pub mod bookings;
pub mod feedback;
pub mod health;
pub mod queues;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
