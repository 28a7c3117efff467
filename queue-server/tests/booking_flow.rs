//! Full booking lifecycle against an in-memory store
//! Run: cargo test -p queue-server --test booking_flow

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

use queue_server::db::models::{
    BookingCreate, BookingStatus, BookingType, Customer, FeedbackCreate, Queue, QueueCreate, Shop,
    ShopCreate,
};
use queue_server::db::repository::{
    BookingRepository, FeedbackRepository, QueueRepository, ShopRepository,
};
use queue_server::notify::SimulatedSmsSender;
use queue_server::realtime::LiveEventBus;
use queue_server::{AppError, Config, LiveEvent, ServerState};

async fn test_state() -> ServerState {
    let db: Surreal<Db> = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let config = Config::with_overrides(".", 0);
    ServerState::with_parts(
        config,
        db,
        Arc::new(LiveEventBus::new()),
        Arc::new(SimulatedSmsSender),
    )
}

async fn seed(state: &ServerState, max_capacity: i64) -> (Shop, Queue) {
    let shop = ShopRepository::new(state.get_db())
        .create(ShopCreate {
            name: "Corner Barbers".into(),
            description: None,
            owner_name: Some("Sam".into()),
            phone: Some("5559999".into()),
            address: None,
            allow_walk_ins: None,
        })
        .await
        .unwrap();
    let queue = QueueRepository::new(state.get_db())
        .create(QueueCreate {
            shop: shop.id.clone().unwrap(),
            name: "Haircuts".into(),
            description: None,
            max_capacity: Some(max_capacity),
            estimated_service_time: Some(15),
        })
        .await
        .unwrap();
    (shop, queue)
}

fn walk_in(shop: &Shop, queue: &Queue, name: &str) -> BookingCreate {
    BookingCreate {
        shop: shop.id.clone().unwrap(),
        queue: queue.id.clone().unwrap(),
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

#[tokio::test]
async fn lifecycle_from_admission_to_feedback() {
    let state = test_state().await;
    let (shop, queue) = seed(&state, 50).await;
    let engine = state.engine();

    // Admission assigns sequential numbers and pre-insert wait estimates
    let first = engine.admit(walk_in(&shop, &queue, "Ana")).await.unwrap();
    let second = engine.admit(walk_in(&shop, &queue, "Ben")).await.unwrap();
    assert_eq!(first.queue_number, 1);
    assert_eq!(first.estimated_wait_time, 0);
    assert_eq!(second.queue_number, 2);
    assert_eq!(second.estimated_wait_time, 15);

    // Feedback requires completion first
    let feedback_repo = FeedbackRepository::new(state.get_db());
    let premature = feedback_repo
        .submit(FeedbackCreate {
            shop: shop.id.clone().unwrap(),
            booking: first.id.clone().unwrap(),
            customer: None,
            rating: 5,
            service_rating: None,
            wait_time_rating: None,
            comments: None,
            would_recommend: Some(true),
        })
        .await;
    assert!(premature.is_err());

    // Serve and complete the first booking
    let first_id = first.id.as_ref().unwrap().to_string();
    let serving = engine
        .update_status(&first_id, BookingStatus::InProgress, None)
        .await
        .unwrap();
    assert!(serving.service_start_time.is_some());

    let done = engine
        .update_status(&first_id, BookingStatus::Completed, None)
        .await
        .unwrap();
    assert!(done.service_end_time.is_some());
    assert!(done.actual_wait_time.is_some());

    // Completion frees the slot; second moves to the front
    let position = engine.position_of(&second).await.unwrap();
    assert_eq!(position.position, 1);
    assert_eq!(position.estimated_wait_time, 0);

    // Feedback is now accepted, exactly once
    let feedback = feedback_repo
        .submit(FeedbackCreate {
            shop: shop.id.clone().unwrap(),
            booking: first.id.clone().unwrap(),
            customer: None,
            rating: 5,
            service_rating: Some(4),
            wait_time_rating: Some(5),
            comments: Some("quick and friendly".into()),
            would_recommend: Some(true),
        })
        .await
        .unwrap();
    assert_eq!(feedback.customer.name, "Ana");

    let duplicate = feedback_repo
        .submit(FeedbackCreate {
            shop: shop.id.clone().unwrap(),
            booking: first.id.clone().unwrap(),
            customer: None,
            rating: 3,
            service_rating: None,
            wait_time_rating: None,
            comments: None,
            would_recommend: None,
        })
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn capacity_and_number_reuse_rules() {
    let state = test_state().await;
    let (shop, queue) = seed(&state, 2).await;
    let engine = state.engine();

    let first = engine.admit(walk_in(&shop, &queue, "Ana")).await.unwrap();
    engine.admit(walk_in(&shop, &queue, "Ben")).await.unwrap();

    // Queue full
    let rejected = engine.admit(walk_in(&shop, &queue, "Cara")).await;
    assert!(matches!(rejected, Err(AppError::CapacityExceeded(_))));

    // Cancellation frees the slot but never the number
    engine
        .cancel(&first.id.as_ref().unwrap().to_string())
        .await
        .unwrap();
    let third = engine.admit(walk_in(&shop, &queue, "Cara")).await.unwrap();
    assert_eq!(third.queue_number, 3);

    let bookings = BookingRepository::new(state.get_db());
    let active = bookings
        .find_active_in_queue(queue.id.as_ref().unwrap())
        .await
        .unwrap();
    let numbers: Vec<i64> = active.iter().map(|b| b.queue_number).collect();
    assert_eq!(numbers, vec![2, 3]);
}

#[tokio::test]
async fn rocksdb_store_opens_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("queueup.db");
    let service = queue_server::db::DbService::new(path.to_str().unwrap())
        .await
        .unwrap();

    let shop = ShopRepository::new(service.db.clone())
        .create(ShopCreate {
            name: "Persisted".into(),
            description: None,
            owner_name: None,
            phone: None,
            address: None,
            allow_walk_ins: None,
        })
        .await
        .unwrap();
    let found = ShopRepository::new(service.db.clone())
        .find_by_id(&shop.id.unwrap().to_string())
        .await
        .unwrap();
    assert_eq!(found.unwrap().name, "Persisted");
}

#[tokio::test]
async fn queue_events_reach_subscribers() {
    let state = test_state().await;
    let (shop, queue) = seed(&state, 50).await;

    let topic = format!("queue-{}", queue.id.as_ref().unwrap().key());
    let mut rx = state.events.subscribe(&topic);

    let booking = state
        .engine()
        .admit(walk_in(&shop, &queue, "Ana"))
        .await
        .unwrap();

    match rx.recv().await.unwrap() {
        LiveEvent::QueueUpdated(update) => {
            assert_eq!(update.total_waiting, 1);
            assert_eq!(update.new_booking.queue_number, booking.queue_number);
            assert_eq!(update.new_booking.customer, "Ana");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
