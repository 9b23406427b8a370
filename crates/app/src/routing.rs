//! Tap-response routing.
//!
//! [`ResponseRouter`] listens to the platform event stream and, when the
//! user taps a device notification, sends the app to the screen that
//! matches the notification's category and data.

use std::fmt;
use std::sync::Arc;

use kudi_events::{NotificationResponse, PlatformEvent};
use serde_json::Value;
use tokio::sync::broadcast;

/// In-app destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    TransactionHistory,
    TransactionDetails,
    SecuritySettings,
    Verification,
    /// Screen named by a promotional notification.
    Custom(String),
}

impl Route {
    pub fn name(&self) -> &str {
        match self {
            Route::Home => "Home",
            Route::TransactionHistory => "TransactionHistory",
            Route::TransactionDetails => "TransactionDetails",
            Route::SecuritySettings => "SecuritySettings",
            Route::Verification => "Verification",
            Route::Custom(screen) => screen,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Navigation capability provided by the host UI.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route, params: Value);
}

/// Pick the destination for a tapped notification's data.
pub fn route_for(data: &Value) -> Route {
    let field = |name: &str| data.get(name).and_then(Value::as_str);
    let category = field("category").unwrap_or_default();
    let kind = field("type").unwrap_or_default();

    if matches!(category, "kyc" | "verification") || matches!(kind, "kyc" | "verification") {
        return Route::Verification;
    }

    match category {
        "transaction" => {
            if field("reference").is_some() || field("transactionId").is_some() {
                Route::TransactionDetails
            } else {
                Route::TransactionHistory
            }
        }
        "security" => Route::SecuritySettings,
        "promotional" => match field("screen") {
            Some(screen) if !screen.is_empty() => Route::Custom(screen.to_string()),
            _ => Route::Home,
        },
        _ => Route::Home,
    }
}

/// Routes tapped device notifications to in-app screens.
pub struct ResponseRouter {
    navigator: Arc<dyn Navigator>,
}

impl ResponseRouter {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Run the routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the scheduler's
    /// [`EventBus`](kudi_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(PlatformEvent::Tapped(response)) => self.handle_tap(&response),
                Ok(PlatformEvent::Received(notification)) => {
                    tracing::debug!(
                        id = %notification.id,
                        title = %notification.title,
                        "Device notification received in foreground"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Response router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Platform event bus closed, response router shutting down");
                    break;
                }
            }
        }
    }

    fn handle_tap(&self, response: &NotificationResponse) {
        let route = route_for(&response.data);
        tracing::info!(
            notification_id = %response.notification_id,
            route = %route,
            "Routing tapped notification"
        );
        self.navigator.navigate(route, response.data.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use kudi_events::EventBus;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<(Route, Value)>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route, params: Value) {
            self.visits.lock().push((route, params));
        }
    }

    #[test]
    fn decision_table() {
        let cases = [
            (json!({"category": "transaction", "reference": "S-1"}), Route::TransactionDetails),
            (json!({"category": "transaction", "transactionId": "T-9"}), Route::TransactionDetails),
            (json!({"category": "transaction", "reference": null}), Route::TransactionHistory),
            (json!({"category": "security", "subtype": "login"}), Route::SecuritySettings),
            (json!({"category": "promotional", "screen": "Airtime"}), Route::Custom("Airtime".into())),
            (json!({"category": "promotional"}), Route::Home),
            (json!({"category": "kyc"}), Route::Verification),
            (json!({"category": "unknown", "type": "verification"}), Route::Verification),
            (json!({"category": "system"}), Route::Home),
            (json!({}), Route::Home),
            (json!(null), Route::Home),
        ];
        for (data, expected) in cases {
            assert_eq!(route_for(&data), expected, "{data}");
        }
    }

    #[tokio::test]
    async fn taps_are_routed_until_bus_closes() {
        let navigator = Arc::new(RecordingNavigator::default());
        let bus = EventBus::default();
        let receiver = bus.subscribe();
        let router = ResponseRouter::new(navigator.clone());
        let handle = tokio::spawn(router.run(receiver));

        bus.publish(PlatformEvent::Tapped(NotificationResponse {
            notification_id: "n-1".into(),
            action_identifier: NotificationResponse::DEFAULT_ACTION.into(),
            data: json!({"category": "security"}),
        }));
        drop(bus);
        handle.await.unwrap();

        let visits = navigator.visits.lock();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].0, Route::SecuritySettings);
        assert_eq!(visits[0].1["category"], "security");
    }
}
