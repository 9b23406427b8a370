//! Application root for the notification subsystem.
//!
//! [`AppState`] builds and owns every component, so there is exactly one
//! dispatcher per process without any global. Share it via `Arc<AppState>`.

use std::sync::Arc;

use kudi_core::types::NotificationId;
use kudi_events::{
    Dispatch, Dispatcher, NotificationPayload, PlatformScheduler, PushToken, Subscription,
};
use kudi_store::{KeyValueStore, NotificationPreferences, PreferenceKey, PreferenceStore};
use tokio::task::JoinHandle;

use crate::bridge::bridge_listener;
use crate::center::{NewNotification, NotificationCenter};
use crate::config::NotifyConfig;
use crate::routing::{Navigator, ResponseRouter};
use crate::toast::ToastQueue;

pub struct AppState {
    pub config: NotifyConfig,
    preferences: PreferenceStore,
    dispatcher: Arc<Dispatcher>,
    scheduler: Arc<dyn PlatformScheduler>,
    toasts: ToastQueue,
    center: Arc<NotificationCenter>,
    _bridge: Subscription,
}

impl AppState {
    /// Load preferences, hand them to the dispatcher, and subscribe the
    /// toast/notification-center bridge.
    pub async fn init(
        config: NotifyConfig,
        storage: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn PlatformScheduler>,
    ) -> Self {
        let preferences = PreferenceStore::load(storage).await;
        let dispatcher = Arc::new(Dispatcher::with_push_delay(
            Arc::clone(&scheduler),
            config.push_delay,
        ));
        dispatcher.set_preferences(preferences.snapshot());

        let toasts = ToastQueue::new(config.toast_duration);
        let center = Arc::new(NotificationCenter::new());
        let bridge = dispatcher.subscribe(bridge_listener(toasts.clone(), Arc::clone(&center)));

        tracing::info!(
            push_delay_secs = config.push_delay.as_secs(),
            toast_duration_ms = config.toast_duration.as_millis() as u64,
            "Notification subsystem initialised"
        );

        Self {
            config,
            preferences,
            dispatcher,
            scheduler,
            toasts,
            center,
            _bridge: bridge,
        }
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    pub fn scheduler(&self) -> &Arc<dyn PlatformScheduler> {
        &self.scheduler
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences.snapshot()
    }

    // --- Preferences ---

    /// Change one preference, persist it, and refresh the dispatcher.
    pub async fn update_preference(&self, key: PreferenceKey, value: bool) -> NotificationPreferences {
        let prefs = self.preferences.update(key, value).await;
        self.dispatcher.set_preferences(prefs);
        if key == PreferenceKey::BadgeEnabled {
            self.sync_badge().await;
        }
        prefs
    }

    pub async fn reset_preferences(&self) -> NotificationPreferences {
        let prefs = self.preferences.reset_to_defaults().await;
        self.dispatcher.set_preferences(prefs);
        self.sync_badge().await;
        prefs
    }

    // --- Dispatch ---

    /// Dispatch a payload and refresh the badge if it got through.
    ///
    /// This is the only dispatch entry point; the dispatcher itself is not
    /// exposed, so every delivered payload is followed by a badge sync.
    pub async fn notify(&self, payload: NotificationPayload) -> Dispatch {
        let dispatch = self.dispatcher.notify(payload);
        if !dispatch.is_suppressed() {
            self.sync_badge().await;
        }
        dispatch
    }

    // --- Notification center ---

    /// Add an entry directly, bypassing the dispatcher.
    pub async fn add_notification(&self, entry: NewNotification) -> NotificationId {
        let id = self.center.add(entry);
        self.sync_badge().await;
        id
    }

    pub async fn mark_as_read(&self, id: NotificationId) -> bool {
        let found = self.center.mark_as_read(id);
        self.sync_badge().await;
        found
    }

    pub async fn mark_all_as_read(&self) -> usize {
        let changed = self.center.mark_all_as_read();
        self.sync_badge().await;
        changed
    }

    pub async fn delete_notification(&self, id: NotificationId) -> bool {
        let found = self.center.delete(id);
        self.sync_badge().await;
        found
    }

    /// Set the app icon badge to the unread count, or clear it when badges
    /// are disabled. Failures are logged.
    pub async fn sync_badge(&self) {
        let count = if self.preferences.snapshot().badge_enabled {
            u32::try_from(self.center.unread_count()).unwrap_or(u32::MAX)
        } else {
            0
        };
        if let Err(e) = self.scheduler.set_badge_count(count).await {
            tracing::error!(error = %e, count, "Failed to update badge count");
        }
    }

    // --- Platform ---

    /// Register the device for push. Returns `None` when registration fails.
    pub async fn register_device(&self) -> Option<PushToken> {
        match self.scheduler.register_for_push().await {
            Ok(token) => {
                tracing::info!(token = %token, "Registered for push notifications");
                Some(token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Push registration failed");
                None
            }
        }
    }

    /// Spawn the tap-response router on the scheduler's event stream.
    pub fn spawn_response_router(&self, navigator: Arc<dyn Navigator>) -> JoinHandle<()> {
        let receiver = self.scheduler.events();
        tokio::spawn(ResponseRouter::new(navigator).run(receiver))
    }
}
