//! Platform notification event bus backed by a `tokio::sync::broadcast`
//! channel.
//!
//! Schedulers publish a [`PlatformEvent`] when a device notification is
//! shown while the app is in the foreground and when the user taps one.
//! The tap-response router and any other interested party subscribe.

use chrono::Utc;
use kudi_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A notification that the platform has presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredNotification {
    /// Identifier returned by the scheduler when the notification was booked.
    pub id: String,
    pub title: String,
    pub body: String,
    /// Data attached at scheduling time; carries `category` and `subtype`.
    pub data: serde_json::Value,
    pub delivered_at: Timestamp,
}

/// The user's response to a presented notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub notification_id: String,
    /// Which action was chosen; [`NotificationResponse::DEFAULT_ACTION`] for
    /// a plain tap.
    pub action_identifier: String,
    pub data: serde_json::Value,
}

impl NotificationResponse {
    pub const DEFAULT_ACTION: &'static str = "default";

    /// A plain tap on `notification`.
    pub fn tap(notification: &DeliveredNotification) -> Self {
        Self {
            notification_id: notification.id.clone(),
            action_identifier: Self::DEFAULT_ACTION.to_string(),
            data: notification.data.clone(),
        }
    }
}

/// Something that happened to a device notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Presented while the app was in the foreground.
    Received(DeliveredNotification),
    /// Tapped by the user.
    Tapped(NotificationResponse),
}

impl DeliveredNotification {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            data,
            delivered_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of [`PlatformEvent`]s.
///
/// Cloning the bus clones the sender, so every clone publishes into the
/// same channel.
///
/// ```rust
/// use kudi_events::bus::{DeliveredNotification, EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::Received(DeliveredNotification::new(
///     "n-1",
///     "Money Received",
///     "You received ₦500",
///     serde_json::json!({}),
/// )));
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn delivered() -> DeliveredNotification {
        DeliveredNotification::new(
            "n-1",
            "Money Received",
            "You received ₦500",
            serde_json::json!({"category": "transaction"}),
        )
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(PlatformEvent::Received(delivered()));

        let received = rx.recv().await.expect("should receive the event");
        assert_matches!(received, PlatformEvent::Received(n) if n.id == "n-1");
    }

    #[tokio::test]
    async fn clones_publish_into_the_same_channel() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.clone()
            .publish(PlatformEvent::Tapped(NotificationResponse::tap(&delivered())));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
        assert_matches!(e1, PlatformEvent::Tapped(r) if r.action_identifier == "default");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::Received(delivered()));
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_value(PlatformEvent::Received(delivered())).unwrap();
        assert_eq!(json["kind"], "received");
        assert_eq!(json["data"]["category"], "transaction");
    }
}
