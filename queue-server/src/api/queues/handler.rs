//! Queue API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{Booking, BookingStatus, Queue, QueueCreate, QueueUpdate};
use crate::db::repository::{BookingRepository, QueueRepository, ShopRepository};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

/// POST /api/queues - 创建队列
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<QueueCreate>,
) -> AppResult<(StatusCode, Json<Queue>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(cap) = payload.max_capacity
        && cap < 1
    {
        return Err(AppError::validation("max_capacity must be at least 1"));
    }
    if let Some(minutes) = payload.estimated_service_time
        && minutes < 1
    {
        return Err(AppError::validation(
            "estimated_service_time must be at least 1",
        ));
    }

    let shops = ShopRepository::new(state.db.clone());
    shops
        .find_by_id(&payload.shop.to_string())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Shop {} not found", payload.shop)))?;

    let repo = QueueRepository::new(state.db.clone());
    let queue = repo.create(payload).await?;
    Ok((StatusCode::CREATED, Json(queue)))
}

/// Queue 详情，附带当前负载
#[derive(Serialize)]
pub struct QueueDetail {
    #[serde(flatten)]
    pub queue: Queue,
    /// 当前活跃 booking 数
    pub current_bookings: i64,
    /// 新加入者的预计等待（分钟）
    pub estimated_wait: i64,
}

/// GET /api/queues/:id - 获取队列及当前负载
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<QueueDetail>> {
    let repo = QueueRepository::new(state.db.clone());
    let queue = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Queue {} not found", id)))?;

    let queue_id = queue
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Queue record has no id"))?;
    let bookings = BookingRepository::new(state.db.clone());
    let current_bookings = bookings.count_active_in_queue(&queue_id).await?;

    Ok(Json(QueueDetail {
        estimated_wait: current_bookings * queue.estimated_service_time,
        queue,
        current_bookings,
    }))
}

/// GET /api/queues/shop/:shop_id - 店铺的活跃队列
pub async fn list_by_shop(
    State(state): State<ServerState>,
    Path(shop_id): Path<String>,
) -> AppResult<Json<Vec<Queue>>> {
    let repo = QueueRepository::new(state.db.clone());
    let queues = repo.find_by_shop(&shop_id).await?;
    Ok(Json(queues))
}

/// PUT /api/queues/:id - 更新队列
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<QueueUpdate>,
) -> AppResult<Json<Queue>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(cap) = payload.max_capacity
        && cap < 1
    {
        return Err(AppError::validation("max_capacity must be at least 1"));
    }
    if let Some(minutes) = payload.estimated_service_time
        && minutes < 1
    {
        return Err(AppError::validation(
            "estimated_service_time must be at least 1",
        ));
    }

    let repo = QueueRepository::new(state.db.clone());
    let queue = repo.update(&id, payload).await?;
    Ok(Json(queue))
}

/// 看板上的一条 booking 摘要
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    pub queue_number: i64,
    pub customer: String,
    pub service: String,
}

impl BoardEntry {
    fn from_booking(booking: &Booking) -> Self {
        Self {
            queue_number: booking.queue_number,
            customer: booking.customer.name.clone(),
            service: booking.service.clone(),
        }
    }
}

/// 实时看板
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBoard {
    pub queue_name: String,
    pub total_waiting: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currently_serving: Option<BoardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_in_line: Option<BoardEntry>,
    /// 新加入者的预计等待（分钟）
    pub estimated_wait: i64,
}

/// GET /api/queues/:id/status - 实时看板
pub async fn live_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<QueueBoard>> {
    let repo = QueueRepository::new(state.db.clone());
    let queue = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Queue {} not found", id)))?;
    let queue_id = queue
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Queue record has no id"))?;

    let bookings = BookingRepository::new(state.db.clone());
    let active = bookings.find_active_in_queue(&queue_id).await?;

    let currently_serving = active
        .iter()
        .find(|b| b.status == BookingStatus::InProgress)
        .map(BoardEntry::from_booking);
    let next_in_line = active
        .iter()
        .find(|b| b.status == BookingStatus::Confirmed)
        .map(BoardEntry::from_booking);

    let total_waiting = active.len() as i64;

    Ok(Json(QueueBoard {
        queue_name: queue.name,
        total_waiting,
        currently_serving,
        next_in_line,
        estimated_wait: total_waiting * queue.estimated_service_time,
    }))
}
