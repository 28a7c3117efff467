//! Queue admission
//!
//! 接收入队请求，分配队列号并广播。队列号来自存储层的原子
//! increment-and-fetch，并发入队不会重号，取消后也不会复用。

use crate::db::models::{
    Booking, BookingCreate, BookingStatus, BookingType, NotificationKind, NotificationRecord,
};
use crate::notify;
use crate::realtime::{LiveEvent, NewBookingSummary, QueueUpdated, queue_topic};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_email,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, now_millis};

use super::QueueEngine;

impl QueueEngine {
    /// Admit a booking into its queue
    ///
    /// Validation and the capacity check happen before the queue number is
    /// taken, so a rejected request leaves no trace. The confirmation SMS is
    /// best-effort and never fails the admission.
    pub async fn admit(&self, request: BookingCreate) -> AppResult<Booking> {
        validate_required_text(&request.customer.name, "customer.name", MAX_NAME_LEN)?;
        validate_required_text(&request.customer.phone, "customer.phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_email(&request.customer.email, "customer.email")?;
        validate_required_text(&request.service, "service", MAX_NOTE_LEN)?;

        let queues = self.queues();
        let bookings = self.bookings();

        let queue = queues
            .find_by_id(&request.queue.to_string())
            .await?
            .filter(|q| q.is_active)
            .ok_or_else(|| AppError::not_found("Queue not found or inactive"))?;
        let queue_id = queue
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Queue record has no id"))?;

        // Capacity gate uses the pre-admission active count; the same count
        // feeds the wait estimate below.
        let active = bookings.count_active_in_queue(&queue_id).await?;
        if active >= queue.max_capacity {
            return Err(AppError::capacity_exceeded(format!(
                "Queue '{}' is full ({} / {})",
                queue.name, active, queue.max_capacity
            )));
        }

        let queue_number = queues.next_queue_number(&queue_id).await?;
        let estimated_wait_time = active * queue.estimated_service_time;

        let status = match request.booking_type {
            BookingType::Appointment => BookingStatus::Confirmed,
            BookingType::WalkIn => BookingStatus::Pending,
        };

        let mut booking = bookings
            .insert(Booking {
                id: None,
                shop: request.shop,
                queue: queue_id.clone(),
                customer: request.customer,
                service: request.service,
                booking_type: request.booking_type,
                scheduled_time: request.scheduled_time,
                queue_number,
                status,
                estimated_wait_time,
                actual_wait_time: None,
                service_start_time: None,
                service_end_time: None,
                notes: None,
                notifications_sent: Vec::new(),
                created_at: now_millis(),
            })
            .await?;

        self.send_confirmation(&mut booking, &queue.name, estimated_wait_time)
            .await;

        self.events().publish(
            &queue_topic(&queue_id),
            LiveEvent::QueueUpdated(QueueUpdated {
                queue_id: queue_id.to_string(),
                total_waiting: active + 1,
                new_booking: NewBookingSummary {
                    queue_number,
                    customer: booking.customer.name.clone(),
                    estimated_wait_time,
                },
            }),
        );

        tracing::info!(
            queue = %queue.name,
            queue_number,
            customer = %booking.customer.name,
            "Booking admitted"
        );

        Ok(booking)
    }

    /// Best-effort confirmation message; logged only on success
    async fn send_confirmation(&self, booking: &mut Booking, queue_name: &str, wait: i64) {
        let shop_name = self.display_name(&booking.shop, queue_name).await;
        let message = notify::confirmation_message(
            &booking.customer.name,
            &shop_name,
            booking.queue_number,
            wait,
        );

        match self.sms().send(&booking.customer.phone, &message).await {
            Ok(()) => {
                let record = NotificationRecord {
                    kind: NotificationKind::Confirmation,
                    sent_at: now_millis(),
                    message,
                };
                if let Some(id) = &booking.id {
                    if let Err(e) = self.bookings().append_notification(id, record.clone()).await {
                        tracing::warn!(error = %e, "Failed to record confirmation notification");
                    }
                }
                booking.notifications_sent.push(record);
            }
            Err(e) => {
                tracing::warn!(
                    phone = %booking.customer.phone,
                    error = %e,
                    "Confirmation SMS failed, continuing"
                );
            }
        }
    }
}
