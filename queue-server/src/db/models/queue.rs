//! Queue Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Queue entity (排队队列)
///
/// `current_number` is the last assigned queue number. It is monotonic over
/// the queue's lifetime and is never reused, even across cancellations and
/// deletions: numbering reads it with an atomic increment-and-fetch, never by
/// counting bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queue {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// Shop reference
    #[serde(with = "serde_helpers::record_id")]
    pub shop: RecordId,
    pub name: String,
    pub description: Option<String>,
    /// Upper bound on concurrently active bookings
    #[serde(default = "default_max_capacity")]
    pub max_capacity: i64,
    /// Last assigned queue number (monotonic)
    #[serde(default)]
    pub current_number: i64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// Minutes per customer, used for wait estimates
    #[serde(default = "default_service_time")]
    pub estimated_service_time: i64,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

fn default_max_capacity() -> i64 {
    50
}

fn default_service_time() -> i64 {
    15
}

/// Create queue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub shop: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub max_capacity: Option<i64>,
    pub estimated_service_time: Option<i64>,
}

/// Update queue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_service_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
