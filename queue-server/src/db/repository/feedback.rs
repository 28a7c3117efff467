//! Feedback Repository
//!
//! Submission rules live at the repository: the booking must exist, must be
//! completed, and must not have feedback already.

use super::{BaseRepository, CountRow, RepoError, RepoResult};
use crate::db::models::{Booking, BookingStatus, Feedback, FeedbackCreate};
use crate::utils::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "feedback";

#[derive(Clone)]
pub struct FeedbackRepository {
    base: BaseRepository,
}

impl FeedbackRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find feedback attached to a booking
    pub async fn find_by_booking(&self, booking_id: &RecordId) -> RepoResult<Option<Feedback>> {
        let rows: Vec<Feedback> = self
            .base
            .db()
            .query("SELECT * FROM feedback WHERE booking = $booking LIMIT 1")
            .bind(("booking", booking_id.to_string()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Submit feedback for a completed booking
    ///
    /// Enforced at write time: one feedback per booking, completed bookings
    /// only. The record is immutable after creation; no update path exists.
    pub async fn submit(&self, data: FeedbackCreate) -> RepoResult<Feedback> {
        if self.find_by_booking(&data.booking).await?.is_some() {
            return Err(RepoError::Duplicate(
                "Feedback already submitted for this booking".to_string(),
            ));
        }

        let booking: Option<Booking> = self.base.db().select(data.booking.clone()).await?;
        let booking = booking
            .ok_or_else(|| RepoError::NotFound(format!("Booking {} not found", data.booking)))?;

        if booking.status != BookingStatus::Completed {
            return Err(RepoError::Validation(
                "Cannot submit feedback for incomplete booking".to_string(),
            ));
        }

        let feedback = Feedback {
            id: None,
            shop: data.shop,
            booking: data.booking,
            customer: data.customer.unwrap_or(booking.customer),
            rating: data.rating,
            service_rating: data.service_rating,
            wait_time_rating: data.wait_time_rating,
            comments: data.comments,
            would_recommend: data.would_recommend,
            created_at: now_millis(),
        };

        let created: Option<Feedback> = self.base.db().create(TABLE).content(feedback).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create feedback".to_string()))
    }

    /// Page of feedback for a shop, newest first; optional exact-rating filter
    pub async fn find_by_shop(
        &self,
        shop_id: &str,
        rating: Option<i64>,
        limit: i64,
        start: i64,
    ) -> RepoResult<Vec<Feedback>> {
        let shop: RecordId = shop_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid shop ID: {}", shop_id)))?;

        let mut sql = String::from("SELECT * FROM feedback WHERE shop = $shop");
        if rating.is_some() {
            sql.push_str(" AND rating = $rating");
        }
        // LIMIT/START do not take bound parameters; both values are integers
        sql.push_str(&format!(
            " ORDER BY created_at DESC LIMIT {} START {}",
            limit.max(1),
            start.max(0)
        ));

        let mut query = self.base.db().query(sql).bind(("shop", shop.to_string()));
        if let Some(rating) = rating {
            query = query.bind(("rating", rating));
        }

        let rows: Vec<Feedback> = query.await?.take(0)?;
        Ok(rows)
    }

    /// Total feedback count for a shop (pagination)
    pub async fn count_by_shop(&self, shop_id: &str, rating: Option<i64>) -> RepoResult<i64> {
        let shop: RecordId = shop_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid shop ID: {}", shop_id)))?;

        let mut sql = String::from("SELECT count() FROM feedback WHERE shop = $shop");
        if rating.is_some() {
            sql.push_str(" AND rating = $rating");
        }
        sql.push_str(" GROUP ALL");

        let mut query = self.base.db().query(sql).bind(("shop", shop.to_string()));
        if let Some(rating) = rating {
            query = query.bind(("rating", rating));
        }

        let rows: Vec<CountRow> = query.await?.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
    }

    /// Every feedback record for a shop (summary aggregation)
    pub async fn find_all_by_shop(&self, shop_id: &str) -> RepoResult<Vec<Feedback>> {
        let shop: RecordId = shop_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid shop ID: {}", shop_id)))?;
        let rows: Vec<Feedback> = self
            .base
            .db()
            .query("SELECT * FROM feedback WHERE shop = $shop")
            .bind(("shop", shop.to_string()))
            .await?
            .take(0)?;
        Ok(rows)
    }
}
