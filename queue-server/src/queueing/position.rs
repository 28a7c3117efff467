//! Position and wait-time calculation
//!
//! Read-time only. The stored admission estimate on the booking never
//! changes; this recomputes from the current active set, so cancellations
//! ahead of a customer shorten their wait.

use crate::db::models::Booking;
use crate::utils::{AppError, AppResult};

use super::QueueEngine;

/// Live position of a booking within its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuePosition {
    /// 1-based; 1 means first in line
    pub position: i64,
    /// Minutes until service, from the current active set
    pub estimated_wait_time: i64,
}

impl QueueEngine {
    /// Current position of an active booking
    ///
    /// Position counts active bookings with a lower queue number, so it is
    /// stable under admissions behind and shrinks as bookings ahead leave.
    pub async fn position_of(&self, booking: &Booking) -> AppResult<QueuePosition> {
        let queue = self
            .queues()
            .find_by_id(&booking.queue.to_string())
            .await?
            .ok_or_else(|| AppError::not_found("Queue not found"))?;

        let ahead = self
            .bookings()
            .count_active_ahead(&booking.queue, booking.queue_number)
            .await?;

        let position = ahead + 1;
        Ok(QueuePosition {
            position,
            estimated_wait_time: (position - 1) * queue.estimated_service_time,
        })
    }
}
