//! Database Models

// Serde helpers
pub mod serde_helpers;

// Tenancy
pub mod shop;

// Queueing
pub mod booking;
pub mod queue;

// Feedback
pub mod feedback;

// Re-exports
pub use booking::{
    Booking, BookingCreate, BookingStatus, BookingStatusPatch, BookingStatusRequest, BookingType,
    Customer, NotificationKind, NotificationRecord,
};
pub use feedback::{Feedback, FeedbackCreate};
pub use queue::{Queue, QueueCreate, QueueUpdate};
pub use shop::{Shop, ShopCreate};
