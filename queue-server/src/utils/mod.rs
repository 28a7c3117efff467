//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - 日志、校验等工具

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use result::AppResult;

/// Current wall-clock time as Unix millis
///
/// 所有时间戳统一使用 i64 Unix millis；日期解析在 API handler 层完成，
/// repository 层只接收 `i64`。
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
