//! Feedback Model

use super::booking::Customer;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Feedback entity (服务评价)
///
/// At most one per booking, created only after the booking completed.
/// Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub shop: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub booking: RecordId,
    pub customer: Customer,
    /// Overall rating, 1-5
    pub rating: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time_rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub would_recommend: Option<bool>,
    #[serde(default)]
    pub created_at: i64,
}

/// Submit feedback payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub shop: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub booking: RecordId,
    /// Defaults to the booking's customer when omitted
    #[serde(default)]
    pub customer: Option<Customer>,
    pub rating: i64,
    #[serde(default)]
    pub service_rating: Option<i64>,
    #[serde(default)]
    pub wait_time_rating: Option<i64>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub would_recommend: Option<bool>,
}
