//! Repository Module
//!
//! Provides typed access to SurrealDB tables.
//!
//! Relation fields (`shop`, `queue`, `booking`) are stored as `"table:id"`
//! strings (see `models::serde_helpers`); queries that filter on them bind
//! the string form. `UPDATE $thing`-style targets bind a native `RecordId`.

pub mod booking;
pub mod feedback;
pub mod queue;
pub mod shop;

// Re-exports
pub use booking::BookingRepository;
pub use feedback::FeedbackRepository;
pub use queue::QueueRepository;
pub use shop::ShopRepository;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Row shape of `SELECT count() ... GROUP ALL`
#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub count: i64,
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
