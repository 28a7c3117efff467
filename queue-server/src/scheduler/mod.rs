//! 通知调度器
//!
//! 两个独立的周期任务：预约提醒（临近 scheduled_time）和叫号提醒
//! （队列中的下一位）。幂等性完全依赖 booking 上的 `notifications_sent`
//! 日志：同一种通知每条 booking 至多发一次，发送失败不记日志，
//! 下个周期自然重试。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::time::MissedTickBehavior;

use crate::core::{BackgroundTasks, Config};
use crate::db::models::{Booking, BookingStatus, NotificationKind, NotificationRecord};
use crate::db::repository::{BookingRepository, QueueRepository, ShopRepository};
use crate::notify::{self, SmsSender};
use crate::utils::now_millis;

/// Periodic notification dispatcher
pub struct NotificationScheduler {
    db: Surreal<Db>,
    sms: Arc<dyn SmsSender>,
    reminder_interval: Duration,
    turn_interval: Duration,
    /// Minutes before `scheduled_time` at which the reminder fires
    reminder_window_mins: i64,
}

impl NotificationScheduler {
    pub fn new(db: Surreal<Db>, sms: Arc<dyn SmsSender>, config: &Config) -> Self {
        Self {
            db,
            sms,
            reminder_interval: Duration::from_secs(config.reminder_interval_secs),
            turn_interval: Duration::from_secs(config.turn_interval_secs),
            reminder_window_mins: config.reminder_window_mins,
        }
    }

    fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.db.clone())
    }

    /// Shop name for message texts, falling back to the queue name
    async fn shop_name(&self, booking: &Booking) -> String {
        let shops = ShopRepository::new(self.db.clone());
        if let Ok(Some(shop)) = shops.find_by_id(&booking.shop.to_string()).await {
            return shop.name;
        }
        let queues = QueueRepository::new(self.db.clone());
        match queues.find_by_id(&booking.queue.to_string()).await {
            Ok(Some(queue)) => queue.name,
            _ => "the shop".to_string(),
        }
    }

    /// Send one notification and append it to the booking's log on success
    ///
    /// Failures are logged and swallowed; the absent log entry makes the next
    /// pass retry.
    async fn dispatch(&self, booking: &Booking, kind: NotificationKind, message: String) {
        match self.sms.send(&booking.customer.phone, &message).await {
            Ok(()) => {
                let record = NotificationRecord {
                    kind,
                    sent_at: now_millis(),
                    message,
                };
                if let Some(id) = &booking.id
                    && let Err(e) = self.bookings().append_notification(id, record).await
                {
                    tracing::warn!(
                        booking = %id,
                        error = %e,
                        "Failed to record sent notification"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    phone = %booking.customer.phone,
                    kind = ?kind,
                    error = %e,
                    "Notification send failed, will retry next pass"
                );
            }
        }
    }

    /// Remind confirmed bookings whose appointment is inside the window
    pub async fn reminder_pass(&self) {
        let now = now_millis();
        let until = now + self.reminder_window_mins * 60_000;

        let due = match self.bookings().find_scheduled_between(now, until).await {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(error = %e, "Reminder pass query failed");
                return;
            }
        };

        for booking in due {
            if booking.has_notification(NotificationKind::Reminder) {
                continue;
            }
            let shop_name = self.shop_name(&booking).await;
            let message = notify::reminder_message(&shop_name, booking.queue_number);
            self.dispatch(&booking, NotificationKind::Reminder, message)
                .await;
        }
    }

    /// Notify the next customer in each queue that their turn is close
    ///
    /// Candidate per queue: the booking after the in-progress one, or the
    /// first in line when nothing is being served.
    pub async fn turn_pass(&self) {
        let active = match self.bookings().find_waiting_or_serving().await {
            Ok(active) => active,
            Err(e) => {
                tracing::error!(error = %e, "Turn pass query failed");
                return;
            }
        };

        let mut by_queue: HashMap<String, Vec<Booking>> = HashMap::new();
        for booking in active {
            by_queue
                .entry(booking.queue.to_string())
                .or_default()
                .push(booking);
        }

        for bookings in by_queue.values_mut() {
            bookings.sort_by_key(|b| b.queue_number);

            let serving_idx = bookings
                .iter()
                .position(|b| b.status == BookingStatus::InProgress);
            let candidate_idx = serving_idx.map(|i| i + 1).unwrap_or(0);

            let Some(candidate) = bookings.get(candidate_idx) else {
                continue;
            };
            if candidate.status == BookingStatus::InProgress
                || candidate.has_notification(NotificationKind::Turn)
            {
                continue;
            }

            let shop_name = self.shop_name(candidate).await;
            let message = notify::turn_message(&shop_name, candidate.queue_number);
            self.dispatch(candidate, NotificationKind::Turn, message)
                .await;
        }
    }

    /// Register both periodic passes
    pub fn spawn(self, tasks: &mut BackgroundTasks) {
        let scheduler = Arc::new(self);

        let reminder = scheduler.clone();
        let token = tasks.shutdown_token();
        tasks.spawn("reminder_pass", async move {
            let mut interval = tokio::time::interval(reminder.reminder_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => reminder.reminder_pass().await,
                }
            }
        });

        let turn = scheduler;
        let token = tasks.shutdown_token();
        tasks.spawn("turn_pass", async move {
            let mut interval = tokio::time::interval(turn.turn_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => turn.turn_pass().await,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use surrealdb::engine::local::Mem;

    use crate::db::models::{
        BookingType, Customer, Queue, QueueCreate, Shop, ShopCreate,
    };
    use crate::notify::NotifyError;

    #[derive(Default)]
    struct RecordingSms {
        sent: Mutex<Vec<(String, String)>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl SmsSender for RecordingSms {
        async fn send(&self, to: &str, message: &str) -> Result<(), NotifyError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError::Gateway("down".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), message.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        db: Surreal<Db>,
        scheduler: NotificationScheduler,
        sms: Arc<RecordingSms>,
        shop: Shop,
        queue: Queue,
    }

    async fn fixture() -> Fixture {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();

        let shop = ShopRepository::new(db.clone())
            .create(ShopCreate {
                name: "Corner Barbers".into(),
                description: None,
                owner_name: None,
                phone: None,
                address: None,
                allow_walk_ins: None,
            })
            .await
            .unwrap();
        let queue = QueueRepository::new(db.clone())
            .create(QueueCreate {
                shop: shop.id.clone().unwrap(),
                name: "Haircuts".into(),
                description: None,
                max_capacity: None,
                estimated_service_time: None,
            })
            .await
            .unwrap();

        let sms = Arc::new(RecordingSms::default());
        let scheduler = NotificationScheduler::new(
            db.clone(),
            sms.clone(),
            &Config::for_tests(),
        );
        Fixture {
            db,
            scheduler,
            sms,
            shop,
            queue,
        }
    }

    async fn insert_booking(
        f: &Fixture,
        number: i64,
        status: BookingStatus,
        scheduled_time: Option<i64>,
    ) -> Booking {
        BookingRepository::new(f.db.clone())
            .insert(Booking {
                id: None,
                shop: f.shop.id.clone().unwrap(),
                queue: f.queue.id.clone().unwrap(),
                customer: Customer {
                    name: format!("Customer {number}"),
                    phone: format!("555000{number}"),
                    email: None,
                },
                service: "haircut".into(),
                booking_type: BookingType::Appointment,
                scheduled_time,
                queue_number: number,
                status,
                estimated_wait_time: 0,
                actual_wait_time: None,
                service_start_time: None,
                service_end_time: None,
                notes: None,
                notifications_sent: Vec::new(),
                created_at: now_millis(),
            })
            .await
            .unwrap()
    }

    fn sent(f: &Fixture) -> Vec<(String, String)> {
        f.sms.sent.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn reminder_is_sent_at_most_once() {
        let f = fixture().await;
        insert_booking(
            &f,
            1,
            BookingStatus::Confirmed,
            Some(now_millis() + 10 * 60_000),
        )
        .await;

        f.scheduler.reminder_pass().await;
        f.scheduler.reminder_pass().await;

        let sent = sent(&f);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Reminder"));
        assert!(sent[0].1.contains("Corner Barbers"));
    }

    #[tokio::test]
    async fn reminder_outside_window_is_skipped() {
        let f = fixture().await;
        insert_booking(
            &f,
            1,
            BookingStatus::Confirmed,
            Some(now_millis() + 60 * 60_000),
        )
        .await;

        f.scheduler.reminder_pass().await;
        assert!(sent(&f).is_empty());
    }

    #[tokio::test]
    async fn failed_reminder_is_retried_next_pass() {
        let f = fixture().await;
        insert_booking(
            &f,
            1,
            BookingStatus::Confirmed,
            Some(now_millis() + 10 * 60_000),
        )
        .await;

        f.sms.fail.store(true, Ordering::SeqCst);
        f.scheduler.reminder_pass().await;
        assert!(sent(&f).is_empty());

        f.sms.fail.store(false, Ordering::SeqCst);
        f.scheduler.reminder_pass().await;
        assert_eq!(sent(&f).len(), 1);
    }

    #[tokio::test]
    async fn turn_pass_notifies_booking_after_in_progress() {
        let f = fixture().await;
        insert_booking(&f, 1, BookingStatus::InProgress, None).await;
        insert_booking(&f, 2, BookingStatus::Confirmed, None).await;
        insert_booking(&f, 3, BookingStatus::Confirmed, None).await;

        f.scheduler.turn_pass().await;

        let sent = sent(&f);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "5550002");
        assert!(sent[0].1.contains("Queue number: 2"));
    }

    #[tokio::test]
    async fn turn_pass_notifies_first_when_nothing_in_progress() {
        let f = fixture().await;
        insert_booking(&f, 1, BookingStatus::Confirmed, None).await;
        insert_booking(&f, 2, BookingStatus::Confirmed, None).await;

        f.scheduler.turn_pass().await;

        let sent = sent(&f);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "5550001");
    }

    #[tokio::test]
    async fn turn_notification_is_sent_at_most_once() {
        let f = fixture().await;
        insert_booking(&f, 1, BookingStatus::Confirmed, None).await;

        f.scheduler.turn_pass().await;
        f.scheduler.turn_pass().await;

        assert_eq!(sent(&f).len(), 1);
    }
}
