//! End-to-end notification scenarios.
//!
//! These exercise the dispatcher, toast queue and notification center
//! together the way the app root wires them, with the in-process
//! scheduler standing in for the device.

use std::sync::Arc;
use std::time::Duration;

use kudi_app::center::{NewNotification, NotificationCenter};
use kudi_app::toast::{Toast, ToastQueue};
use kudi_core::category::{Category, ToastType};
use kudi_events::{
    Dispatcher, LocalScheduler, NotificationPayload, TransactionKind, TransactionNotice,
};
use kudi_store::{NotificationPreferences, PreferenceKey};
use parking_lot::Mutex;

fn recording_dispatcher(
    prefs: NotificationPreferences,
) -> (Dispatcher, LocalScheduler, Arc<Mutex<Vec<NotificationPayload>>>) {
    let scheduler = LocalScheduler::new();
    let dispatcher = Dispatcher::new(Arc::new(scheduler.clone()));
    dispatcher.set_preferences(prefs);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    dispatcher.subscribe(Arc::new(move |payload: &NotificationPayload| {
        sink.lock().push(payload.clone());
    }));
    (dispatcher, scheduler, seen)
}

fn received_alert_prefs(received: bool) -> NotificationPreferences {
    let mut prefs = NotificationPreferences::default();
    prefs.set(PreferenceKey::PushEnabled, true);
    prefs.set(PreferenceKey::TransactionAlerts, true);
    prefs.set(PreferenceKey::ReceivedTransactionAlerts, received);
    prefs
}

fn chukwudi_payment() -> TransactionNotice {
    TransactionNotice::new(TransactionKind::Received, 15000.0).with_counterparty("@chukwudi")
}

// ---------------------------------------------------------------------------
// Scenario A: received transaction with alerts enabled
// ---------------------------------------------------------------------------

#[tokio::test]
async fn received_transaction_reaches_listener_and_device() {
    let (dispatcher, scheduler, seen) = recording_dispatcher(received_alert_prefs(true));

    dispatcher
        .notify_transaction(&chukwudi_payment())
        .push_settled()
        .await;

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "Money Received");
    assert!(seen[0].message.contains("₦15,000"));
    assert!(seen[0].message.contains("@chukwudi"));
    assert_eq!(scheduler.scheduled_count(), 1);
}

// ---------------------------------------------------------------------------
// Scenario B: received-transaction subtype disabled
// ---------------------------------------------------------------------------

#[tokio::test]
async fn received_transaction_blocked_by_subtype_flag() {
    let (dispatcher, scheduler, seen) = recording_dispatcher(received_alert_prefs(false));

    let dispatch = dispatcher.notify_transaction(&chukwudi_payment());
    assert!(dispatch.is_suppressed());
    dispatch.push_settled().await;
    tokio::task::yield_now().await;

    assert!(seen.lock().is_empty());
    assert_eq!(scheduler.scheduled_count(), 0);
}

// ---------------------------------------------------------------------------
// Scenario C: five entries then mark all as read
// ---------------------------------------------------------------------------

#[test]
fn mark_all_as_read_keeps_order() {
    let center = NotificationCenter::new();
    let ids: Vec<_> = (1..=5)
        .map(|i| center.add(NewNotification::new(Category::Transaction, format!("n{i}"), "m")))
        .collect();
    assert_eq!(center.unread_count(), 5);

    center.mark_all_as_read();

    assert_eq!(center.unread_count(), 0);
    let entries = center.list();
    assert!(entries.iter().all(|n| n.read));
    let listed: Vec<_> = entries.iter().map(|n| n.id).collect();
    let newest_first: Vec<_> = ids.into_iter().rev().collect();
    assert_eq!(listed, newest_first);
}

// ---------------------------------------------------------------------------
// Scenario D: toast expires without manual dismissal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_toast_expires_on_its_own() {
    let queue = ToastQueue::default();
    let id = queue.show(
        Toast::new(ToastType::Success, "Money Sent", "You sent ₦800")
            .with_duration(Duration::from_millis(100)),
    );
    assert!(queue.contains(id));

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(!queue.contains(id));
    assert!(queue.visible().iter().all(|t| t.id != id));
}

// ---------------------------------------------------------------------------
// Master flags suppress every surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn disabled_master_flag_suppresses_every_category_surface() {
    let cases = [
        (PreferenceKey::TransactionAlerts, Category::Transaction),
        (PreferenceKey::SecurityAlerts, Category::Security),
        (PreferenceKey::PromotionalUpdates, Category::Promotional),
        (PreferenceKey::SystemAlerts, Category::System),
    ];

    for (key, category) in cases {
        let mut prefs = NotificationPreferences::default();
        prefs.set(PreferenceKey::PromotionalUpdates, true);
        prefs.set(key, false);
        let (dispatcher, scheduler, seen) = recording_dispatcher(prefs);

        dispatcher
            .notify(NotificationPayload::new(category, "title", "message"))
            .push_settled()
            .await;

        assert!(seen.lock().is_empty(), "{key} should block {category}");
        assert_eq!(scheduler.scheduled_count(), 0);
    }
}
