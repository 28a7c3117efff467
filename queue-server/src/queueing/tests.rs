//! Engine scenario tests on an in-memory store

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

use crate::db::models::{
    Booking, BookingCreate, BookingStatus, BookingType, Customer, Queue, QueueCreate, Shop,
    ShopCreate,
};
use crate::db::repository::{QueueRepository, ShopRepository};
use crate::notify::{NotifyError, SmsSender};
use crate::queueing::QueueEngine;
use crate::queueing::status::derive_status_effects;
use crate::realtime::{EventSink, LiveEvent};
use crate::utils::AppError;

async fn mem_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[derive(Default)]
struct RecordingSms {
    sent: Mutex<Vec<(String, String)>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingSms {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send(&self, to: &str, message: &str) -> Result<(), NotifyError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotifyError::Gateway("down".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(String, LiveEvent)>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<(String, LiveEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, topic: &str, event: LiveEvent) {
        self.events.lock().unwrap().push((topic.to_string(), event));
    }
}

struct Fixture {
    db: Surreal<Db>,
    engine: QueueEngine,
    sms: Arc<RecordingSms>,
    sink: Arc<RecordingSink>,
    shop: Shop,
    queue: Queue,
}

async fn fixture(max_capacity: i64) -> Fixture {
    let db = mem_db().await;
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
            max_capacity: Some(max_capacity),
            estimated_service_time: Some(15),
        })
        .await
        .unwrap();

    let sms = Arc::new(RecordingSms::default());
    let sink = Arc::new(RecordingSink::default());
    let engine = QueueEngine::new(db.clone(), sms.clone(), sink.clone());
    Fixture {
        db,
        engine,
        sms,
        sink,
        shop,
        queue,
    }
}

fn request(f: &Fixture, name: &str) -> BookingCreate {
    BookingCreate {
        shop: f.shop.id.clone().unwrap(),
        queue: f.queue.id.clone().unwrap(),
        customer: Customer {
            name: name.into(),
            phone: "5550001".into(),
            email: None,
        },
        service: "haircut".into(),
        booking_type: BookingType::WalkIn,
        scheduled_time: None,
    }
}

async fn admit(f: &Fixture, name: &str) -> Booking {
    f.engine.admit(request(f, name)).await.unwrap()
}

#[tokio::test]
async fn admissions_get_sequential_numbers_and_waits() {
    let f = fixture(50).await;

    let first = admit(&f, "Ana").await;
    let second = admit(&f, "Ben").await;

    assert_eq!(first.queue_number, 1);
    assert_eq!(first.estimated_wait_time, 0);
    assert_eq!(second.queue_number, 2);
    assert_eq!(second.estimated_wait_time, 15);
}

#[tokio::test]
async fn walk_in_starts_pending_appointment_starts_confirmed() {
    let f = fixture(50).await;

    let walk_in = admit(&f, "Ana").await;
    assert_eq!(walk_in.status, BookingStatus::Pending);

    let mut req = request(&f, "Ben");
    req.booking_type = BookingType::Appointment;
    let appointment = f.engine.admit(req).await.unwrap();
    assert_eq!(appointment.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn full_queue_rejects_admission_without_writing() {
    let f = fixture(1).await;
    admit(&f, "Ana").await;

    let err = f.engine.admit(request(&f, "Ben")).await.unwrap_err();
    assert!(matches!(err, AppError::CapacityExceeded(_)));

    let active = f
        .engine
        .bookings()
        .find_active_in_queue(f.queue.id.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    // The rejected request must not have consumed a number either
    let next = admit_after_completion(&f).await;
    assert_eq!(next.queue_number, 2);
}

async fn admit_after_completion(f: &Fixture) -> Booking {
    // Free a slot, then admit
    let active = f
        .engine
        .bookings()
        .find_active_in_queue(f.queue.id.as_ref().unwrap())
        .await
        .unwrap();
    let id = active[0].id.as_ref().unwrap().to_string();
    f.engine
        .update_status(&id, BookingStatus::Completed, None)
        .await
        .unwrap();
    admit(f, "Cara").await
}

#[tokio::test]
async fn cancelled_numbers_are_never_reused() {
    let f = fixture(50).await;
    let first = admit(&f, "Ana").await;
    admit(&f, "Ben").await;

    f.engine
        .cancel(&first.id.as_ref().unwrap().to_string())
        .await
        .unwrap();

    let third = admit(&f, "Cara").await;
    assert_eq!(third.queue_number, 3);
}

#[tokio::test]
async fn position_drops_when_someone_ahead_cancels() {
    let f = fixture(50).await;
    let first = admit(&f, "Ana").await;
    let second = admit(&f, "Ben").await;

    let before = f.engine.position_of(&second).await.unwrap();
    assert_eq!(before.position, 2);
    assert_eq!(before.estimated_wait_time, 15);

    f.engine
        .cancel(&first.id.as_ref().unwrap().to_string())
        .await
        .unwrap();

    let second = f
        .engine
        .bookings()
        .find_by_id(&second.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    let after = f.engine.position_of(&second).await.unwrap();
    assert_eq!(after.position, 1);
    assert_eq!(after.estimated_wait_time, 0);
    // Queue number is immutable; only position moved
    assert_eq!(second.queue_number, 2);
}

#[tokio::test]
async fn in_progress_then_completed_records_actual_wait() {
    let f = fixture(50).await;
    let booking = admit(&f, "Ana").await;
    let id = booking.id.as_ref().unwrap().to_string();

    let serving = f
        .engine
        .update_status(&id, BookingStatus::InProgress, None)
        .await
        .unwrap();
    assert!(serving.service_start_time.is_some());

    let done = f
        .engine
        .update_status(&id, BookingStatus::Completed, Some("all good".into()))
        .await
        .unwrap();
    assert!(done.service_end_time.is_some());
    assert_eq!(done.actual_wait_time, Some(0));
    assert_eq!(done.notes.as_deref(), Some("all good"));
}

#[test]
fn actual_wait_is_whole_minutes_from_service_start() {
    let booking = Booking {
        id: None,
        shop: "shop:s".parse().unwrap(),
        queue: "queue:q".parse().unwrap(),
        customer: Customer {
            name: "Ana".into(),
            phone: "5550001".into(),
            email: None,
        },
        service: "haircut".into(),
        booking_type: BookingType::WalkIn,
        scheduled_time: None,
        queue_number: 1,
        status: BookingStatus::InProgress,
        estimated_wait_time: 0,
        actual_wait_time: None,
        service_start_time: Some(1_000_000),
        service_end_time: None,
        notes: None,
        notifications_sent: Vec::new(),
        created_at: 0,
    };

    let patch = derive_status_effects(&booking, BookingStatus::Completed, None, 1_000_000 + 10 * 60_000);
    assert_eq!(patch.actual_wait_time, Some(10));
    assert_eq!(patch.service_end_time, Some(1_600_000));
}

#[test]
fn completed_without_start_leaves_actual_wait_unset() {
    let booking = Booking {
        id: None,
        shop: "shop:s".parse().unwrap(),
        queue: "queue:q".parse().unwrap(),
        customer: Customer {
            name: "Ana".into(),
            phone: "5550001".into(),
            email: None,
        },
        service: "haircut".into(),
        booking_type: BookingType::WalkIn,
        scheduled_time: None,
        queue_number: 1,
        status: BookingStatus::Pending,
        estimated_wait_time: 0,
        actual_wait_time: None,
        service_start_time: None,
        service_end_time: None,
        notes: None,
        notifications_sent: Vec::new(),
        created_at: 0,
    };

    let patch = derive_status_effects(&booking, BookingStatus::Completed, None, 60_000);
    assert_eq!(patch.actual_wait_time, None);
    assert_eq!(patch.service_end_time, Some(60_000));
}

#[tokio::test]
async fn sms_failure_does_not_fail_admission() {
    let f = fixture(50).await;
    f.sms.set_fail(true);

    let booking = admit(&f, "Ana").await;
    assert!(booking.notifications_sent.is_empty());
    assert!(f.sms.sent().is_empty());
}

#[tokio::test]
async fn admission_sends_confirmation_and_logs_it() {
    let f = fixture(50).await;
    let booking = admit(&f, "Ana").await;

    let sent = f.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "5550001");
    assert!(sent[0].1.contains("Corner Barbers"));
    assert!(sent[0].1.contains("Queue number: 1"));
    assert_eq!(booking.notifications_sent.len(), 1);
}

#[tokio::test]
async fn lifecycle_events_are_broadcast() {
    let f = fixture(50).await;
    let booking = admit(&f, "Ana").await;
    let id = booking.id.as_ref().unwrap().to_string();

    f.engine
        .update_status(&id, BookingStatus::InProgress, None)
        .await
        .unwrap();
    f.engine.cancel(&id).await.unwrap();

    let events = f.sink.events();
    assert_eq!(events.len(), 3);
    let topic = format!("queue-{}", f.queue.id.as_ref().unwrap().key());
    assert!(events.iter().all(|(t, _)| *t == topic));
    assert!(matches!(events[0].1, LiveEvent::QueueUpdated(_)));
    assert!(matches!(events[1].1, LiveEvent::BookingStatusUpdated(_)));
    assert!(matches!(events[2].1, LiveEvent::BookingCancelled(_)));
}

#[tokio::test]
async fn blank_customer_name_is_rejected() {
    let f = fixture(50).await;
    let req = request(&f, "  ");

    let err = f.engine.admit(req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn inactive_queue_rejects_admission() {
    let f = fixture(50).await;
    QueueRepository::new(f.db.clone())
        .update(
            &f.queue.id.as_ref().unwrap().to_string(),
            crate::db::models::QueueUpdate {
                name: None,
                description: None,
                max_capacity: None,
                estimated_service_time: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

    let err = f.engine.admit(request(&f, "Ana")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
