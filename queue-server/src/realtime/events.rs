//! Live event payloads
//!
//! Wire shapes delivered to queue displays and customer status pages.
//! Field names are camelCase on the wire; the event tag is kebab-case
//! (`queue-updated`, `booking-status-updated`, `booking-cancelled`).

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::db::models::BookingStatus;

/// Topic for a shop's displays
pub fn shop_topic(shop: &RecordId) -> String {
    format!("shop-{}", shop.key())
}

/// Topic for a single queue's displays
pub fn queue_topic(queue: &RecordId) -> String {
    format!("queue-{}", queue.key())
}

/// Summary of a freshly admitted booking inside `queue-updated`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingSummary {
    pub queue_number: i64,
    pub customer: String,
    pub estimated_wait_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueUpdated {
    pub queue_id: String,
    pub total_waiting: i64,
    pub new_booking: NewBookingSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusUpdated {
    pub booking_id: String,
    pub queue_number: i64,
    pub status: BookingStatus,
    pub customer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingCancelled {
    pub queue_number: i64,
}

/// Event published to a topic's subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum LiveEvent {
    QueueUpdated(QueueUpdated),
    BookingStatusUpdated(BookingStatusUpdated),
    BookingCancelled(BookingCancelled),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_tagged_and_camel_case() {
        let event = LiveEvent::QueueUpdated(QueueUpdated {
            queue_id: "queue:abc".into(),
            total_waiting: 3,
            new_booking: NewBookingSummary {
                queue_number: 7,
                customer: "Ana".into(),
                estimated_wait_time: 30,
            },
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "queue-updated");
        assert_eq!(json["data"]["queueId"], "queue:abc");
        assert_eq!(json["data"]["totalWaiting"], 3);
        assert_eq!(json["data"]["newBooking"]["queueNumber"], 7);
        assert_eq!(json["data"]["newBooking"]["estimatedWaitTime"], 30);
    }

    #[test]
    fn status_update_tag() {
        let event = LiveEvent::BookingCancelled(BookingCancelled { queue_number: 4 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "booking-cancelled");
        assert_eq!(json["data"]["queueNumber"], 4);
    }
}
