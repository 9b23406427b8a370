//! Device notification seam.
//!
//! [`PlatformScheduler`] is everything the dispatcher and the application
//! root need from the OS notification layer. [`LocalScheduler`] is the
//! in-process implementation: it presents notifications after their delay,
//! tracks the badge and permission state, and lets a host simulate taps.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::bus::{DeliveredNotification, EventBus, NotificationResponse, PlatformEvent};
use crate::delivery::DeliveryError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A device notification to present after `delay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub delay: Duration,
    pub sound: bool,
    pub vibrate: bool,
}

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Opaque device push token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PushToken(pub String);

impl fmt::Display for PushToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PlatformScheduler
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PlatformScheduler: Send + Sync {
    /// Book a notification, returning its platform identifier.
    async fn schedule(&self, request: ScheduleRequest) -> Result<String, DeliveryError>;

    /// Remove every pending and presented notification.
    async fn dismiss_all(&self) -> Result<(), DeliveryError>;

    async fn set_badge_count(&self, count: u32) -> Result<(), DeliveryError>;

    async fn permission_status(&self) -> PermissionStatus;

    /// Register the device and return its push token.
    async fn register_for_push(&self) -> Result<PushToken, DeliveryError>;

    /// Stream of foreground-received and tapped notifications.
    fn events(&self) -> broadcast::Receiver<PlatformEvent>;
}

// ---------------------------------------------------------------------------
// LocalScheduler
// ---------------------------------------------------------------------------

/// Presented notifications kept for [`LocalScheduler::delivered`] and taps.
/// The oldest is dropped past this.
pub const DELIVERED_HISTORY_LIMIT: usize = 64;

struct LocalState {
    permission: PermissionStatus,
    pending: HashMap<String, ScheduleRequest>,
    delivered: VecDeque<DeliveredNotification>,
    scheduled_total: usize,
    badge: u32,
}

struct LocalInner {
    state: Mutex<LocalState>,
    bus: EventBus,
}

impl LocalInner {
    /// Present a pending notification. A request removed by `dismiss_all`
    /// in the meantime is skipped.
    fn present(&self, id: &str) {
        let delivered = {
            let mut state = self.state.lock();
            let Some(request) = state.pending.remove(id) else {
                tracing::debug!(id, "Scheduled notification was dismissed before firing");
                return;
            };
            let delivered =
                DeliveredNotification::new(id, request.title, request.body, request.data);
            state.delivered.push_back(delivered.clone());
            if state.delivered.len() > DELIVERED_HISTORY_LIMIT {
                state.delivered.pop_front();
            }
            delivered
        };
        tracing::debug!(id, title = %delivered.title, "Local notification presented");
        self.bus.publish(PlatformEvent::Received(delivered));
    }
}

/// In-process scheduler. Cloning shares the same state.
///
/// Requires a Tokio runtime: each scheduled notification is presented by a
/// spawned timer task.
#[derive(Clone)]
pub struct LocalScheduler {
    inner: Arc<LocalInner>,
}

impl LocalScheduler {
    /// A scheduler with permission already granted.
    pub fn new() -> Self {
        Self::with_permission(PermissionStatus::Granted)
    }

    pub fn with_permission(permission: PermissionStatus) -> Self {
        Self {
            inner: Arc::new(LocalInner {
                state: Mutex::new(LocalState {
                    permission,
                    pending: HashMap::new(),
                    delivered: VecDeque::new(),
                    scheduled_total: 0,
                    badge: 0,
                }),
                bus: EventBus::default(),
            }),
        }
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.inner.state.lock().permission = permission;
    }

    /// Number of notifications ever accepted by [`schedule`](PlatformScheduler::schedule).
    pub fn scheduled_count(&self) -> usize {
        self.inner.state.lock().scheduled_total
    }

    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Presented notifications, oldest first, up to
    /// [`DELIVERED_HISTORY_LIMIT`].
    pub fn delivered(&self) -> Vec<DeliveredNotification> {
        self.inner.state.lock().delivered.iter().cloned().collect()
    }

    pub fn badge_count(&self) -> u32 {
        self.inner.state.lock().badge
    }

    /// Simulate the user tapping a presented notification.
    ///
    /// Returns `false` if no presented notification has that id.
    pub fn tap(&self, id: &str) -> bool {
        let response = {
            let state = self.inner.state.lock();
            match state.delivered.iter().find(|n| n.id == id) {
                Some(n) => NotificationResponse::tap(n),
                None => return false,
            }
        };
        self.inner.bus.publish(PlatformEvent::Tapped(response));
        true
    }
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformScheduler for LocalScheduler {
    async fn schedule(&self, request: ScheduleRequest) -> Result<String, DeliveryError> {
        let id = uuid::Uuid::now_v7().to_string();
        let delay = request.delay;
        {
            let mut state = self.inner.state.lock();
            if state.permission != PermissionStatus::Granted {
                return Err(DeliveryError::PermissionDenied);
            }
            state.pending.insert(id.clone(), request);
            state.scheduled_total += 1;
        }

        let inner = Arc::clone(&self.inner);
        let task_id = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.present(&task_id);
        });

        tracing::debug!(id = %id, delay_ms = delay.as_millis() as u64, "Local notification scheduled");
        Ok(id)
    }

    async fn dismiss_all(&self) -> Result<(), DeliveryError> {
        let mut state = self.inner.state.lock();
        state.pending.clear();
        state.delivered.clear();
        Ok(())
    }

    async fn set_badge_count(&self, count: u32) -> Result<(), DeliveryError> {
        self.inner.state.lock().badge = count;
        Ok(())
    }

    async fn permission_status(&self) -> PermissionStatus {
        self.inner.state.lock().permission
    }

    async fn register_for_push(&self) -> Result<PushToken, DeliveryError> {
        if self.permission_status().await != PermissionStatus::Granted {
            return Err(DeliveryError::PermissionDenied);
        }
        Ok(PushToken(format!("LocalPushToken[{}]", uuid::Uuid::new_v4())))
    }

    fn events(&self) -> broadcast::Receiver<PlatformEvent> {
        self.inner.bus.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn request(delay: Duration) -> ScheduleRequest {
        ScheduleRequest {
            title: "Money Received".into(),
            body: "You received ₦500".into(),
            data: serde_json::json!({"category": "transaction"}),
            delay,
            sound: true,
            vibrate: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_notification_is_presented_after_delay() {
        let scheduler = LocalScheduler::new();
        let mut events = scheduler.events();

        let id = scheduler.schedule(request(Duration::from_secs(2))).await.unwrap();
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.delivered().is_empty());

        let event = events.recv().await.unwrap();
        assert_matches!(event, PlatformEvent::Received(n) if n.id == id);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.delivered().len(), 1);
        assert_eq!(scheduler.scheduled_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_all_drops_pending_notifications() {
        let scheduler = LocalScheduler::new();
        scheduler.schedule(request(Duration::from_secs(2))).await.unwrap();
        scheduler.dismiss_all().await.unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(scheduler.delivered().is_empty());
        assert_eq!(scheduler.scheduled_count(), 1);
    }

    #[tokio::test]
    async fn schedule_without_permission_fails() {
        let scheduler = LocalScheduler::with_permission(PermissionStatus::Denied);
        assert_matches!(
            scheduler.schedule(request(Duration::ZERO)).await,
            Err(DeliveryError::PermissionDenied)
        );
        assert_matches!(
            scheduler.register_for_push().await,
            Err(DeliveryError::PermissionDenied)
        );
        assert_eq!(scheduler.scheduled_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tap_publishes_response_with_data() {
        let scheduler = LocalScheduler::new();
        let mut events = scheduler.events();
        let id = scheduler.schedule(request(Duration::ZERO)).await.unwrap();
        assert_matches!(events.recv().await.unwrap(), PlatformEvent::Received(_));

        assert!(scheduler.tap(&id));
        assert!(!scheduler.tap("missing"));

        let event = events.recv().await.unwrap();
        assert_matches!(
            event,
            PlatformEvent::Tapped(r) if r.notification_id == id && r.data["category"] == "transaction"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delivered_history_drops_oldest_past_limit() {
        let scheduler = LocalScheduler::new();
        let mut ids = Vec::new();
        for _ in 0..DELIVERED_HISTORY_LIMIT + 3 {
            ids.push(scheduler.schedule(request(Duration::ZERO)).await.unwrap());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;

        let delivered = scheduler.delivered();
        assert_eq!(delivered.len(), DELIVERED_HISTORY_LIMIT);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!scheduler.tap(&ids[0]));
        assert!(scheduler.tap(&ids[ids.len() - 1]));
    }

    #[tokio::test]
    async fn badge_and_token() {
        let scheduler = LocalScheduler::new();
        scheduler.set_badge_count(4).await.unwrap();
        assert_eq!(scheduler.badge_count(), 4);

        let token = scheduler.register_for_push().await.unwrap();
        assert!(token.to_string().starts_with("LocalPushToken["));
    }
}
