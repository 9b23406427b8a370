use std::sync::Arc;
use std::time::Duration;

use kudi_app::config::NotifyConfig;
use kudi_app::routing::{Navigator, Route};
use kudi_app::AppState;
use kudi_events::{
    LocalScheduler, NotificationPayload, PlatformScheduler, SecurityEvent, SecurityNotice,
    TransactionKind, TransactionNotice,
};
use kudi_store::PreferenceKey;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Navigator that only logs where the app would go.
struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route, params: serde_json::Value) {
        tracing::info!(route = %route, %params, "Navigate");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kudi_app=debug,kudi_events=debug,kudi_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = NotifyConfig::from_env();
    tracing::info!(?config, "Loaded notification configuration");

    // --- Platform scheduler ---
    // Keep a handle on the local scheduler so the demo can simulate a tap.
    let local = config.expo_push_token.is_none().then(LocalScheduler::new);
    let scheduler: Arc<dyn PlatformScheduler> = match &local {
        Some(local) => Arc::new(local.clone()),
        None => config.scheduler()?,
    };

    // --- Application root ---
    let storage = config.storage();
    let state = AppState::init(config, storage, scheduler).await;
    state.register_device().await;
    let router = state.spawn_response_router(Arc::new(LogNavigator));

    // --- Simulated events ---
    state
        .notify(NotificationPayload::transaction(
            &TransactionNotice::new(TransactionKind::Received, 15000.0)
                .with_counterparty("@chukwudi")
                .with_reference("SESS-0001"),
        ))
        .await;
    state
        .notify(NotificationPayload::security(
            &SecurityNotice::new(SecurityEvent::Login).with_detail("Pixel 8, Lagos"),
        ))
        .await;

    // Promotions are off by default.
    let promo = state
        .notify(NotificationPayload::promotion(
            "Cashback Friday",
            "Get 5% back on airtime",
            Some("Airtime"),
        ))
        .await;
    tracing::info!(suppressed = promo.is_suppressed(), "Promotion dispatched");

    state.update_preference(PreferenceKey::PromotionalUpdates, true).await;
    state
        .notify(NotificationPayload::promotion(
            "Cashback Friday",
            "Get 5% back on airtime",
            Some("Airtime"),
        ))
        .await;

    for toast in state.toasts().visible() {
        tracing::info!(title = %toast.title, kind = ?toast.toast_type, offset = toast.offset, "Toast");
    }
    for entry in state.center().list() {
        tracing::info!(title = %entry.title, time = %entry.timestamp_label, "Stored notification");
    }
    tracing::info!(unread = state.center().unread_count(), "Notification center");

    // Wait for the device notifications, then tap the first one.
    tokio::time::sleep(state.config.push_delay + Duration::from_millis(200)).await;
    if let Some(local) = &local {
        if let Some(first) = local.delivered().first() {
            local.tap(&first.id);
        }
        tracing::info!(badge = local.badge_count(), "Badge");
    }

    state.mark_all_as_read().await;
    tracing::info!(unread = state.center().unread_count(), "Marked all as read");

    // Let the router handle the tap and the toasts expire.
    tokio::time::sleep(state.config.toast_duration).await;
    tracing::info!(toasts = state.toasts().len(), "Toasts after expiry");
    router.abort();

    Ok(())
}
