//! Ephemeral in-app banners.
//!
//! A toast is appended to the active list by [`ToastQueue::show`] and leaves
//! it through exactly one of three paths: its timer fires, the user swipes it
//! away, or the user taps its action. Whichever comes first removes it and
//! runs its `on_close` callback; later attempts are no-ops. Timers are not
//! cancelled on early dismissal, they simply find nothing to remove.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kudi_core::category::ToastType;
use kudi_core::types::{new_notification_id, NotificationId};
use parking_lot::Mutex;

/// Default time a toast stays on screen.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

/// Vertical distance between stacked toasts, in points.
pub const TOAST_STACK_OFFSET: u32 = 80;

pub type ToastId = NotificationId;

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

/// Button shown on a toast.
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction").field("label", &self.label).finish()
    }
}

/// A toast to be shown.
pub struct Toast {
    pub toast_type: ToastType,
    pub title: String,
    pub message: String,
    /// `None` uses the queue's default duration.
    pub duration: Option<Duration>,
    pub action: Option<ToastAction>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl Toast {
    pub fn new(toast_type: ToastType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            toast_type,
            title: title.into(),
            message: message.into(),
            duration: None,
            action: None,
            on_close: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_action(
        mut self,
        label: impl Into<String>,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(ToastAction {
            label: label.into(),
            callback: Arc::new(callback),
        });
        self
    }

    /// Run `callback` once when the toast is removed, whatever removed it.
    pub fn on_close(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toast")
            .field("toast_type", &self.toast_type)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("duration", &self.duration)
            .field("action", &self.action)
            .field("has_on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Render-ready view of an active toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastView {
    pub id: ToastId,
    pub toast_type: ToastType,
    pub title: String,
    pub message: String,
    pub action_label: Option<String>,
    /// Distance from the top of the stack.
    pub offset: u32,
}

struct ActiveToast {
    id: ToastId,
    toast: Toast,
}

// ---------------------------------------------------------------------------
// ToastQueue
// ---------------------------------------------------------------------------

/// Ordered list of visible toasts. Cloning shares the same list.
#[derive(Clone)]
pub struct ToastQueue {
    active: Arc<Mutex<Vec<ActiveToast>>>,
    default_duration: Duration,
}

impl ToastQueue {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            default_duration,
        }
    }

    /// Append a toast and start its dismiss timer.
    ///
    /// Outside a Tokio runtime no timer can be started; the toast then stays
    /// until dismissed by hand.
    pub fn show(&self, toast: Toast) -> ToastId {
        let id = new_notification_id();
        let duration = toast.duration.unwrap_or(self.default_duration);
        tracing::debug!(%id, title = %toast.title, ?duration, "Showing toast");
        self.active.lock().push(ActiveToast { id, toast });

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let queue = self.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(duration).await;
                    queue.hide(id);
                });
            }
            Err(_) => tracing::warn!(%id, "No async runtime, toast will not auto-dismiss"),
        }
        id
    }

    /// Remove a toast. Returns `false` if it was already gone.
    pub fn hide(&self, id: ToastId) -> bool {
        let removed = {
            let mut active = self.active.lock();
            match active.iter().position(|t| t.id == id) {
                Some(index) => active.remove(index),
                None => return false,
            }
        };

        tracing::debug!(%id, "Toast removed");
        if let Some(on_close) = removed.toast.on_close {
            on_close();
        }
        true
    }

    /// Run the toast's action, then dismiss it.
    ///
    /// Returns `false` if the toast is gone or has no action.
    pub fn trigger_action(&self, id: ToastId) -> bool {
        let callback = {
            let active = self.active.lock();
            active
                .iter()
                .find(|t| t.id == id)
                .and_then(|t| t.toast.action.as_ref())
                .map(|action| Arc::clone(&action.callback))
        };
        let Some(callback) = callback else {
            return false;
        };

        callback();
        self.hide(id);
        true
    }

    /// Visible toasts in stacking order.
    pub fn visible(&self) -> Vec<ToastView> {
        self.active
            .lock()
            .iter()
            .enumerate()
            .map(|(index, t)| ToastView {
                id: t.id,
                toast_type: t.toast.toast_type,
                title: t.toast.title.clone(),
                message: t.toast.message.clone(),
                action_label: t.toast.action.as_ref().map(|a| a.label.clone()),
                offset: index as u32 * TOAST_STACK_OFFSET,
            })
            .collect()
    }

    pub fn contains(&self, id: ToastId) -> bool {
        self.active.lock().iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
