//! Shop Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Shop entity (店铺)
///
/// Parent of queues and bookings; used for query scoping and for the shop
/// name in outbound customer messages. Shop CRUD has no HTTP surface here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub allow_walk_ins: bool,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create shop payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopCreate {
    pub name: String,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub allow_walk_ins: Option<bool>,
}
