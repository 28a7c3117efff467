//! Booking Repository
//!
//! 查询约定：active = status ∈ {pending, confirmed, in_progress}

use super::{BaseRepository, CountRow, RepoError, RepoResult};
use crate::db::models::{
    Booking, BookingStatus, BookingStatusPatch, NotificationRecord,
};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "booking";

/// Statuses that count against capacity and position
const ACTIVE_STATUSES: [&str; 3] = ["pending", "confirmed", "in_progress"];

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn active_statuses() -> Vec<String> {
        ACTIVE_STATUSES.iter().map(|s| s.to_string()).collect()
    }

    /// Find booking by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let booking: Option<Booking> = self.base.db().select(thing).await?;
        Ok(booking)
    }

    /// Insert a fully-formed booking
    pub async fn insert(&self, booking: Booking) -> RepoResult<Booking> {
        let created: Option<Booking> = self.base.db().create(TABLE).content(booking).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create booking".to_string()))
    }

    /// Count active bookings in a queue
    pub async fn count_active_in_queue(&self, queue_id: &RecordId) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM booking WHERE queue = $queue AND status IN $statuses GROUP ALL")
            .bind(("queue", queue_id.to_string()))
            .bind(("statuses", Self::active_statuses()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
    }

    /// Count active bookings ahead of the given queue number
    pub async fn count_active_ahead(
        &self,
        queue_id: &RecordId,
        queue_number: i64,
    ) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query(
                "SELECT count() FROM booking \
                 WHERE queue = $queue AND queue_number < $number AND status IN $statuses \
                 GROUP ALL",
            )
            .bind(("queue", queue_id.to_string()))
            .bind(("number", queue_number))
            .bind(("statuses", Self::active_statuses()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
    }

    /// Active bookings in a queue, ordered by queue number
    pub async fn find_active_in_queue(&self, queue_id: &RecordId) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(
                "SELECT * FROM booking WHERE queue = $queue AND status IN $statuses \
                 ORDER BY queue_number ASC",
            )
            .bind(("queue", queue_id.to_string()))
            .bind(("statuses", Self::active_statuses()))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Bookings for a shop, newest first; optional status filter and
    /// `[start, end)` window on `created_at`
    pub async fn find_by_shop(
        &self,
        shop_id: &str,
        status: Option<BookingStatus>,
        created_window: Option<(i64, i64)>,
    ) -> RepoResult<Vec<Booking>> {
        let shop: RecordId = shop_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid shop ID: {}", shop_id)))?;

        let mut sql = String::from("SELECT * FROM booking WHERE shop = $shop");
        if status.is_some() {
            sql.push_str(" AND status = $status");
        }
        if created_window.is_some() {
            sql.push_str(" AND created_at >= $start AND created_at < $end");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = self.base.db().query(sql).bind(("shop", shop.to_string()));
        if let Some(status) = status {
            query = query.bind(("status", status.as_str().to_string()));
        }
        if let Some((start, end)) = created_window {
            query = query.bind(("start", start)).bind(("end", end));
        }

        let bookings: Vec<Booking> = query.await?.take(0)?;
        Ok(bookings)
    }

    /// Confirmed bookings with a scheduled time inside `[from, until]`
    ///
    /// Reminder-log filtering happens at the caller; this is just the window
    /// scan.
    pub async fn find_scheduled_between(&self, from: i64, until: i64) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(
                "SELECT * FROM booking WHERE status = 'confirmed' \
                 AND scheduled_time != NONE \
                 AND scheduled_time >= $from AND scheduled_time <= $until",
            )
            .bind(("from", from))
            .bind(("until", until))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// All confirmed/in-progress bookings across queues (turn-notification scan)
    pub async fn find_waiting_or_serving(&self) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE status IN ['confirmed', 'in_progress']")
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Apply a status transition patch
    pub async fn apply_status_patch(
        &self,
        id: &RecordId,
        patch: BookingStatusPatch,
    ) -> RepoResult<Booking> {
        let updated: Option<Booking> = self.base.db().update(id.clone()).merge(patch).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Booking {} not found", id)))
    }

    /// Append one entry to the notification log
    ///
    /// The log is append-only; nothing ever rewrites existing entries.
    pub async fn append_notification(
        &self,
        id: &RecordId,
        record: NotificationRecord,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $booking SET notifications_sent += $entry")
            .bind(("booking", id.clone()))
            .bind(("entry", record))
            .await?;
        Ok(())
    }

    /// Hard delete; returns the removed booking when it existed
    pub async fn delete(&self, id: &str) -> RepoResult<Option<Booking>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let deleted: Option<Booking> = self.base.db().delete(thing).await?;
        Ok(deleted)
    }
}
