//! 实时广播
//!
//! 无状态的 topic 扇出：publish 是 at-most-once、fire-and-forget，
//! 不落盘、不重试、没有投递保证。订阅者掉线丢消息是预期行为。
//!
//! Broadcaster 作为显式依赖注入 ([`EventSink`])，不走全局句柄，
//! 便于在测试中替换成记录型的 sink。

use dashmap::DashMap;
use tokio::sync::broadcast;

use super::LiveEvent;

/// Seam through which components emit live events
///
/// Held as `Arc<dyn EventSink>` by the engine; the production implementation
/// is [`LiveEventBus`].
pub trait EventSink: Send + Sync {
    fn publish(&self, topic: &str, event: LiveEvent);
}

/// Production broadcaster, one broadcast channel per topic
///
/// Channels are created lazily on first subscribe; publishing to a topic with
/// no subscribers is a no-op.
#[derive(Debug)]
pub struct LiveEventBus {
    channels: DashMap<String, broadcast::Sender<LiveEvent>>,
    capacity: usize,
}

impl LiveEventBus {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Join a topic; session scoping is the caller's concern
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<LiveEvent> {
        let tx = self
            .channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Number of current subscribers of a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.channels
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl EventSink for LiveEventBus {
    fn publish(&self, topic: &str, event: LiveEvent) {
        if let Some(tx) = self.channels.get(topic) {
            // Err means no live receivers; nothing to do
            let _ = tx.send(event);
        } else {
            tracing::trace!(topic = %topic, "No subscribers for topic, event dropped");
        }
    }
}

impl Default for LiveEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::events::BookingCancelled;

    fn cancelled(n: i64) -> LiveEvent {
        LiveEvent::BookingCancelled(BookingCancelled { queue_number: n })
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_noop() {
        let bus = LiveEventBus::new();
        bus.publish("queue-x", cancelled(1));
        assert_eq!(bus.subscriber_count("queue-x"), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_topic_events_only() {
        let bus = LiveEventBus::new();
        let mut rx = bus.subscribe("queue-a");
        bus.publish("queue-b", cancelled(1));
        bus.publish("queue-a", cancelled(2));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, cancelled(2));
        assert!(rx.try_recv().is_err());
    }
}
