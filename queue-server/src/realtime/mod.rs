//! Live Queue Broadcaster
//!
//! Topic-keyed fan-out of queue state changes (`shop-{id}` / `queue-{id}`).

pub mod broadcaster;
pub mod events;

pub use broadcaster::{EventSink, LiveEventBus};
pub use events::{
    BookingCancelled, BookingStatusUpdated, LiveEvent, NewBookingSummary, QueueUpdated,
    queue_topic, shop_topic,
};
