//! Feedback API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Booking, BookingStatus, Feedback, FeedbackCreate};
use crate::db::repository::{BookingRepository, FeedbackRepository};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_rating};
use crate::utils::{AppError, AppResult};

/// POST /api/feedback - 提交评价
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<FeedbackCreate>,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    validate_rating(payload.rating, "rating")?;
    if let Some(rating) = payload.service_rating {
        validate_rating(rating, "service_rating")?;
    }
    if let Some(rating) = payload.wait_time_rating {
        validate_rating(rating, "wait_time_rating")?;
    }
    validate_optional_text(&payload.comments, "comments", MAX_NOTE_LEN)?;

    let repo = FeedbackRepository::new(state.db.clone());
    let feedback = repo.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

#[derive(Deserialize)]
pub struct FeedbackListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// 精确匹配总评分
    pub rating: Option<i64>,
}

#[derive(Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Serialize)]
pub struct FeedbackPage {
    pub feedback: Vec<Feedback>,
    pub pagination: Pagination,
}

/// GET /api/feedback/shop/:shop_id - 分页评价列表，最新在前
pub async fn list_by_shop(
    State(state): State<ServerState>,
    Path(shop_id): Path<String>,
    Query(query): Query<FeedbackListQuery>,
) -> AppResult<Json<FeedbackPage>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let start = (page - 1) * limit;

    let repo = FeedbackRepository::new(state.db.clone());
    let feedback = repo
        .find_by_shop(&shop_id, query.rating, limit, start)
        .await?;
    let total = repo.count_by_shop(&shop_id, query.rating).await?;

    Ok(Json(FeedbackPage {
        feedback,
        pagination: Pagination {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit,
        },
    }))
}

/// 店铺评价汇总
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total_feedback: i64,
    /// 平均总评分，保留一位小数
    pub average_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_service_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_wait_time_rating: Option<f64>,
    /// 1-5 各评分的条数
    pub rating_distribution: [i64; 5],
    /// 愿意推荐的比例（百分比，一位小数）；无人作答时为 None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_rate: Option<f64>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0i64), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(round1(sum as f64 / count as f64))
    }
}

/// GET /api/feedback/shop/:shop_id/summary - 汇总统计
pub async fn summary(
    State(state): State<ServerState>,
    Path(shop_id): Path<String>,
) -> AppResult<Json<FeedbackSummary>> {
    let repo = FeedbackRepository::new(state.db.clone());
    let all = repo.find_all_by_shop(&shop_id).await?;

    let mut rating_distribution = [0i64; 5];
    for feedback in &all {
        if (1..=5).contains(&feedback.rating) {
            rating_distribution[(feedback.rating - 1) as usize] += 1;
        }
    }

    let recommend_votes: Vec<bool> = all.iter().filter_map(|f| f.would_recommend).collect();
    let recommendation_rate = if recommend_votes.is_empty() {
        None
    } else {
        let yes = recommend_votes.iter().filter(|v| **v).count();
        Some(round1(yes as f64 * 100.0 / recommend_votes.len() as f64))
    };

    Ok(Json(FeedbackSummary {
        total_feedback: all.len() as i64,
        average_rating: average(all.iter().map(|f| f.rating)).unwrap_or(0.0),
        average_service_rating: average(all.iter().filter_map(|f| f.service_rating)),
        average_wait_time_rating: average(all.iter().filter_map(|f| f.wait_time_rating)),
        rating_distribution,
        recommendation_rate,
    }))
}

/// 评价表单预填信息
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackForm {
    pub booking: Booking,
    /// 是否可以提交评价
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// GET /api/feedback/booking/:booking_id/form - 表单预填 + 可提交性
pub async fn form(
    State(state): State<ServerState>,
    Path(booking_id): Path<String>,
) -> AppResult<Json<FeedbackForm>> {
    let bookings = BookingRepository::new(state.db.clone());
    let booking = bookings
        .find_by_id(&booking_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking_id)))?;

    let repo = FeedbackRepository::new(state.db.clone());
    let booking_rid = booking
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Booking record has no id"))?;

    let (eligible, reason) = if repo.find_by_booking(&booking_rid).await?.is_some() {
        (false, Some("Feedback already submitted"))
    } else if booking.status != BookingStatus::Completed {
        (false, Some("Booking is not completed"))
    } else {
        (true, None)
    };

    Ok(Json(FeedbackForm {
        booking,
        eligible,
        reason,
    }))
}
