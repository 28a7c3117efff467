//! Booking API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Booking, BookingCreate, BookingStatus, BookingStatusRequest};
use crate::db::repository::BookingRepository;
use crate::queueing::QueuePosition;
use crate::utils::{AppError, AppResult};

/// POST /api/bookings - 入队
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BookingCreate>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state.engine().admit(payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Booking 详情，附带实时位置
#[derive(Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    /// 仅对未终结的 booking 有意义
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<QueuePosition>,
}

/// GET /api/bookings/:id - 获取单个 booking，含实时位置和最新等待估算
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookingDetail>> {
    let repo = BookingRepository::new(state.db.clone());
    let booking = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {} not found", id)))?;

    let queue_position = if booking.status.is_active() {
        Some(state.engine().position_of(&booking).await?)
    } else {
        None
    };

    Ok(Json(BookingDetail {
        booking,
        queue_position,
    }))
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
    /// YYYY-MM-DD，按 created_at 的 UTC 当日窗口过滤
    pub date: Option<String>,
}

/// GET /api/bookings/shop/:shop_id - 店铺的 booking 列表，最新在前
pub async fn list_by_shop(
    State(state): State<ServerState>,
    Path(shop_id): Path<String>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let window = match &query.date {
        Some(date) => Some(day_window(date)?),
        None => None,
    };

    let repo = BookingRepository::new(state.db.clone());
    let bookings = repo.find_by_shop(&shop_id, query.status, window).await?;
    Ok(Json(bookings))
}

/// `[start, end)` 毫秒窗口，覆盖给定 UTC 日期
fn day_window(date: &str) -> AppResult<(i64, i64)> {
    let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date: {}", date)))?;
    let start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::validation(format!("Invalid date: {}", date)))?
        .and_utc()
        .timestamp_millis();
    Ok((start, start + 24 * 60 * 60 * 1000))
}

/// PUT /api/bookings/:id/status - 状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<BookingStatusRequest>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .engine()
        .update_status(&id, payload.status, payload.notes)
        .await?;
    Ok(Json(booking))
}

/// DELETE /api/bookings/:id - 取消（硬删除）
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.engine().cancel(&id).await?;
    Ok(Json(true))
}
