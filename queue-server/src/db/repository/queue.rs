//! Queue Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Queue, QueueCreate, QueueUpdate};
use crate::utils::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "queue";

#[derive(Clone)]
pub struct QueueRepository {
    base: BaseRepository,
}

impl QueueRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find queue by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Queue>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let queue: Option<Queue> = self.base.db().select(thing).await?;
        Ok(queue)
    }

    /// Find all active queues for a shop
    pub async fn find_by_shop(&self, shop_id: &str) -> RepoResult<Vec<Queue>> {
        let shop: RecordId = shop_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid shop ID: {}", shop_id)))?;
        let queues: Vec<Queue> = self
            .base
            .db()
            .query("SELECT * FROM queue WHERE shop = $shop AND is_active = true ORDER BY name")
            .bind(("shop", shop.to_string()))
            .await?
            .take(0)?;
        Ok(queues)
    }

    /// Create a new queue
    pub async fn create(&self, data: QueueCreate) -> RepoResult<Queue> {
        let queue = Queue {
            id: None,
            shop: data.shop,
            name: data.name,
            description: data.description,
            max_capacity: data.max_capacity.unwrap_or(50),
            current_number: 0,
            is_active: true,
            estimated_service_time: data.estimated_service_time.unwrap_or(15),
            created_at: now_millis(),
        };

        let created: Option<Queue> = self.base.db().create(TABLE).content(queue).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create queue".to_string()))
    }

    /// Partial update of a queue
    ///
    /// `current_number` is deliberately not updatable here; it moves only
    /// through [`next_queue_number`](Self::next_queue_number).
    pub async fn update(&self, id: &str, data: QueueUpdate) -> RepoResult<Queue> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Queue {} not found", id)))?;

        let updated: Option<Queue> = self.base.db().update(thing).merge(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Queue {} not found", id)))
    }

    /// Atomically increment `current_number` and return the new value
    ///
    /// Single-statement increment-and-fetch: there is no read-max-then-write
    /// window, so concurrent admissions into the same queue can never be
    /// handed the same number, and cancelled bookings never cause reuse.
    pub async fn next_queue_number(&self, queue_id: &RecordId) -> RepoResult<i64> {
        let updated: Vec<Queue> = self
            .base
            .db()
            .query("UPDATE $queue SET current_number += 1 RETURN AFTER")
            .bind(("queue", queue_id.clone()))
            .await?
            .take(0)?;

        updated
            .into_iter()
            .next()
            .map(|q| q.current_number)
            .ok_or_else(|| RepoError::NotFound(format!("Queue {} not found", queue_id)))
    }
}
