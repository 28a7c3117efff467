//! Booking status transitions
//!
//! 状态写入的副作用只由新状态决定，不校验前置状态（有意的宽松
//! 语义）。时间戳派生逻辑是纯函数，便于单测。

use surrealdb::RecordId;

use crate::db::models::{Booking, BookingStatus, BookingStatusPatch};
use crate::realtime::{BookingCancelled, BookingStatusUpdated, LiveEvent, queue_topic};
use crate::utils::{AppError, AppResult};

use super::QueueEngine;

/// Derive the field patch a status write implies
///
/// - `in_progress` stamps `service_start_time` once.
/// - `completed` stamps `service_end_time` and, when a start exists,
///   `actual_wait_time` in whole minutes.
/// - Supplied notes always overwrite.
pub fn derive_status_effects(
    booking: &Booking,
    status: BookingStatus,
    notes: Option<String>,
    now: i64,
) -> BookingStatusPatch {
    let mut patch = BookingStatusPatch {
        status,
        notes,
        ..Default::default()
    };

    match status {
        BookingStatus::InProgress => {
            if booking.service_start_time.is_none() {
                patch.service_start_time = Some(now);
            }
        }
        BookingStatus::Completed => {
            patch.service_end_time = Some(now);
            if let Some(start) = booking.service_start_time {
                patch.actual_wait_time = Some((now - start) / 60_000);
            }
        }
        _ => {}
    }

    patch
}

impl QueueEngine {
    /// Transition a booking to a new status
    pub async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
        notes: Option<String>,
    ) -> AppResult<Booking> {
        let bookings = self.bookings();
        let booking = bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        let record_id: RecordId = id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid ID: {}", id)))?;

        let patch = derive_status_effects(&booking, status, notes, crate::utils::now_millis());
        let updated = bookings.apply_status_patch(&record_id, patch).await?;

        self.events().publish(
            &queue_topic(&booking.queue),
            LiveEvent::BookingStatusUpdated(BookingStatusUpdated {
                booking_id: record_id.to_string(),
                queue_number: booking.queue_number,
                status,
                customer: booking.customer.name.clone(),
            }),
        );

        tracing::info!(
            booking = %record_id,
            status = status.as_str(),
            "Booking status updated"
        );

        Ok(updated)
    }

    /// Cancel a booking by removing it
    ///
    /// Hard delete. The queue number is burned; numbering is monotonic and
    /// never backfills the gap.
    pub async fn cancel(&self, id: &str) -> AppResult<Booking> {
        let removed = self
            .bookings()
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;

        self.events().publish(
            &queue_topic(&removed.queue),
            LiveEvent::BookingCancelled(BookingCancelled {
                queue_number: removed.queue_number,
            }),
        );

        tracing::info!(
            booking = %id,
            queue_number = removed.queue_number,
            "Booking cancelled"
        );

        Ok(removed)
    }
}
