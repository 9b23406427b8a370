//! Central fan-out from feature code to every notification surface.
//!
//! [`Dispatcher::notify`] checks the latest preference snapshot, invokes
//! every subscribed listener synchronously in subscription order, and then
//! books a device notification on a spawned task. Device scheduling is
//! best-effort: failures are logged and never reach the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use kudi_core::category::{Category, Subtype};
use kudi_core::channels::Channel;
use kudi_store::NotificationPreferences;
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::filter::should_send;
use crate::payload::{NotificationPayload, SecurityNotice, TransactionNotice};
use crate::platform::{PlatformScheduler, ScheduleRequest};

/// Offset before the device notification so it does not land on top of the
/// in-app toast.
pub const DEFAULT_PUSH_DELAY: Duration = Duration::from_secs(2);

/// A subscriber to dispatched notifications.
pub type Listener = Arc<dyn Fn(&NotificationPayload) + Send + Sync>;

type Registry = RwLock<Vec<(u64, Listener)>>;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle returned by [`Dispatcher::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone or the
    /// dispatcher has been dropped.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut listeners = registry.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What [`Dispatcher::notify`] did with a payload.
#[derive(Debug)]
pub enum Dispatch {
    /// Blocked by preferences: no listener ran, nothing was scheduled.
    Suppressed,
    /// Passed the filter.
    Delivered {
        /// How many listeners were invoked.
        listeners: usize,
        /// The device scheduling task, if one was spawned. Awaiting it is
        /// optional; it never fails.
        push: Option<JoinHandle<()>>,
    },
}

impl Dispatch {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Dispatch::Suppressed)
    }

    pub fn listener_count(&self) -> usize {
        match self {
            Dispatch::Suppressed => 0,
            Dispatch::Delivered { listeners, .. } => *listeners,
        }
    }

    /// Wait for the device scheduling task, if any, to finish.
    pub async fn push_settled(self) {
        if let Dispatch::Delivered { push: Some(handle), .. } = self {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Push scheduling task panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Preference-filtered notification fan-out.
///
/// One instance is owned by the application root and shared by `Arc`.
pub struct Dispatcher {
    preferences: RwLock<Option<NotificationPreferences>>,
    listeners: Arc<Registry>,
    next_listener_id: AtomicU64,
    scheduler: Arc<dyn PlatformScheduler>,
    push_delay: Duration,
}

impl Dispatcher {
    pub fn new(scheduler: Arc<dyn PlatformScheduler>) -> Self {
        Self::with_push_delay(scheduler, DEFAULT_PUSH_DELAY)
    }

    pub fn with_push_delay(scheduler: Arc<dyn PlatformScheduler>, push_delay: Duration) -> Self {
        Self {
            preferences: RwLock::new(None),
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_listener_id: AtomicU64::new(1),
            scheduler,
            push_delay,
        }
    }

    /// Replace the preference snapshot used for filtering.
    pub fn set_preferences(&self, prefs: NotificationPreferences) {
        *self.preferences.write() = Some(prefs);
    }

    /// Current snapshot; `None` until the first [`set_preferences`](Self::set_preferences).
    pub fn preferences(&self) -> Option<NotificationPreferences> {
        *self.preferences.read()
    }

    pub fn scheduler(&self) -> &Arc<dyn PlatformScheduler> {
        &self.scheduler
    }

    /// Register a listener. Listeners run in subscription order.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Filter and fan out a payload.
    ///
    /// Without a preference snapshot every payload passes. The device
    /// notification is scheduled on a spawned task, so this must be called
    /// from within a Tokio runtime for it to happen; outside one the step
    /// is skipped with a warning.
    pub fn notify(&self, payload: NotificationPayload) -> Dispatch {
        let prefs = self.preferences();

        if let Some(prefs) = &prefs {
            if !should_send(prefs, payload.category, Channel::Push, payload.subtype) {
                tracing::debug!(
                    category = %payload.category,
                    subtype = ?payload.subtype,
                    "Notification suppressed by preferences"
                );
                return Dispatch::Suppressed;
            }
        }

        // Snapshot so listeners can (un)subscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &listeners {
            listener(&payload);
        }

        let push = self.spawn_push(&payload, prefs.as_ref());

        tracing::debug!(
            category = %payload.category,
            listeners = listeners.len(),
            push_scheduled = push.is_some(),
            "Notification dispatched"
        );

        Dispatch::Delivered {
            listeners: listeners.len(),
            push,
        }
    }

    pub fn notify_transaction(&self, notice: &TransactionNotice) -> Dispatch {
        self.notify(NotificationPayload::transaction(notice))
    }

    pub fn notify_security(&self, notice: &SecurityNotice) -> Dispatch {
        self.notify(NotificationPayload::security(notice))
    }

    pub fn notify_promotion(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        screen: Option<&str>,
    ) -> Dispatch {
        self.notify(NotificationPayload::promotion(title, message, screen))
    }

    pub fn notify_system(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        subtype: Option<Subtype>,
    ) -> Dispatch {
        self.notify(NotificationPayload::system(title, message, subtype))
    }

    fn spawn_push(
        &self,
        payload: &NotificationPayload,
        prefs: Option<&NotificationPreferences>,
    ) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, skipping device notification");
            return None;
        };

        let request = ScheduleRequest {
            title: payload.title.clone(),
            body: payload.message.clone(),
            data: push_data(payload),
            delay: self.push_delay,
            sound: prefs.map_or(true, |p| p.sound_enabled),
            vibrate: prefs.map_or(true, |p| p.vibration_enabled),
        };
        let scheduler = Arc::clone(&self.scheduler);
        let category = payload.category;

        Some(runtime.spawn(async move {
            match scheduler.schedule(request).await {
                Ok(id) => tracing::debug!(id = %id, category = %category, "Device notification scheduled"),
                Err(e) => tracing::error!(error = %e, category = %category, "Failed to schedule device notification"),
            }
        }))
    }
}

/// The payload data with `category` and `subtype` merged in, so a tapped
/// device notification can be routed without the original payload.
fn push_data(payload: &NotificationPayload) -> serde_json::Value {
    let mut data = match &payload.data {
        serde_json::Value::Object(map) => map.clone(),
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".into(), other.clone());
            map
        }
    };
    // An unrecognised category keeps the producer's own name for routing.
    if payload.category == Category::Unknown {
        data.entry("category")
            .or_insert_with(|| payload.category.as_str().into());
    } else {
        data.insert("category".into(), payload.category.as_str().into());
    }
    if let Some(subtype) = payload.subtype {
        data.insert("subtype".into(), subtype.as_str().into());
    }
    serde_json::Value::Object(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
