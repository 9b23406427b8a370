//! The app-level dispatcher listener.
//!
//! Every payload that passes the dispatcher's filter becomes one toast and
//! one notification-center entry. The two then live independently: the
//! toast expires on its timer, the entry stays until deleted.

use std::sync::Arc;

use kudi_core::category::Category;
use kudi_events::{toast_type, Listener, NotificationPayload};

use crate::center::{NewNotification, NotificationCenter};
use crate::toast::{Toast, ToastQueue};

/// Build the listener that feeds `toasts` and `center`.
pub fn bridge_listener(toasts: ToastQueue, center: Arc<NotificationCenter>) -> Listener {
    Arc::new(move |payload: &NotificationPayload| {
        toasts.show(toast_for(payload));
        center.add(entry_for(payload));
    })
}

pub fn toast_for(payload: &NotificationPayload) -> Toast {
    Toast::new(
        toast_type(payload.category, payload.subtype),
        payload.title.clone(),
        payload.message.clone(),
    )
}

pub fn entry_for(payload: &NotificationPayload) -> NewNotification {
    let mut entry = NewNotification::new(
        payload.category,
        payload.title.clone(),
        payload.message.clone(),
    )
    .with_icon(payload.category.icon())
    .actionable(matches!(
        payload.category,
        Category::Transaction | Category::Security
    ));
    if let Some(amount) = payload.amount() {
        entry = entry.with_amount(amount);
    }
    entry
}
