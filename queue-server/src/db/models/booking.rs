//! Booking Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Booking status
///
/// `pending → confirmed → in_progress → completed`, with `cancelled` and
/// `no_show` reachable from any non-terminal state. Status writes derive
/// their side effects from the new value only; prior-state legality is not
/// enforced (accepted leniency).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Active bookings count against queue capacity and position
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Storage representation, for query literals
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }
}

/// Booking type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Appointment,
    WalkIn,
}

/// Why a message was sent, used to prevent duplicate dispatch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Confirmation,
    Reminder,
    Turn,
}

/// One entry of the append-only notification log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub kind: NotificationKind,
    pub sent_at: i64,
    pub message: String,
}

/// Customer contact info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Booking entity (预约/排队记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub shop: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub queue: RecordId,
    pub customer: Customer,
    pub service: String,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<i64>,
    /// Assigned once at admission, immutable
    pub queue_number: i64,
    pub status: BookingStatus,
    /// Minutes, computed at admission; static thereafter
    #[serde(default)]
    pub estimated_wait_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_wait_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Append-only; written only by admission and the notification scheduler
    #[serde(default)]
    pub notifications_sent: Vec<NotificationRecord>,
    #[serde(default)]
    pub created_at: i64,
}

impl Booking {
    /// Whether a notification of this kind was already sent
    pub fn has_notification(&self, kind: NotificationKind) -> bool {
        self.notifications_sent.iter().any(|n| n.kind == kind)
    }
}

/// Admission request payload (POST /api/bookings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub shop: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub queue: RecordId,
    pub customer: Customer,
    pub service: String,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<i64>,
}

/// Status transition request payload (PUT /api/bookings/{id}/status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Field patch applied on a status transition
///
/// Only fields the new status derives are written; everything else is left
/// untouched by the merge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingStatusPatch {
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_end_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_wait_time: Option<i64>,
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Pending
    }
}
