//! Per-key change notifications between store handles.
//!
//! A [`ChangeBus`] holds one tokio broadcast channel per storage key; every
//! handle of a key subscribes to the same channel and learns about writes made
//! through other handles. Delivery is best effort: the durable store stays the
//! source of truth.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered notifications per key before older ones are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// A change notification: `{key, value}` plus the identity of the publishing
/// cell. Broadcast channels deliver to every subscriber, the publisher
/// included, so receivers use `origin` to skip their own notifications.
#[derive(Clone, Debug)]
pub struct ChangeMessage {
    pub key: String,
    pub value: Value,
    pub origin: Uuid,
}

/// Registry of per-key broadcast channels.
#[derive(Debug, Default)]
pub struct ChangeBus {
    channels: Mutex<HashMap<String, broadcast::Sender<ChangeMessage>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, key: &str) -> broadcast::Sender<ChangeMessage> {
        let mut channels = self.channels.lock().expect("change bus mutex poisoned");
        channels
            .entry(key.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribes to change notifications for one key.
    pub fn subscribe(&self, key: &str) -> broadcast::Receiver<ChangeMessage> {
        self.sender(key).subscribe()
    }

    /// Publishes a change notification for one key.
    ///
    /// Returns the number of subscribers the notification reached; a channel
    /// with no subscribers is not an error.
    pub fn publish(&self, key: &str, value: Value, origin: Uuid) -> usize {
        let message = ChangeMessage {
            key: key.to_string(),
            value,
            origin,
        };
        self.sender(key).send(message).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_without_subscribers_reaches_nobody() {
        let bus = ChangeBus::new();
        let reached = bus.publish("items", json!([]), Uuid::new_v4());
        assert_eq!(reached, 0);
    }

    #[test]
    fn test_subscriber_receives_published_message() {
        let bus = ChangeBus::new();
        let mut rx = bus.subscribe("items");
        let origin = Uuid::new_v4();

        let reached = bus.publish("items", json!({"a": 1}), origin);
        assert_eq!(reached, 1);

        let message = rx.try_recv().unwrap();
        assert_eq!(message.key, "items");
        assert_eq!(message.value, json!({"a": 1}));
        assert_eq!(message.origin, origin);
    }

    #[test]
    fn test_channels_are_scoped_per_key() {
        let bus = ChangeBus::new();
        let mut items_rx = bus.subscribe("items");
        let mut settings_rx = bus.subscribe("settings");

        bus.publish("items", json!([1]), Uuid::new_v4());

        assert!(items_rx.try_recv().is_ok());
        assert!(settings_rx.try_recv().is_err());
    }
}
