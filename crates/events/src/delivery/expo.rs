//! Remote push through an Expo-compatible push service, with
//! exponential-backoff retry.
//!
//! The service has no notion of delayed delivery, so [`ExpoPushScheduler`]
//! waits out the request's delay itself before posting. Badge and dismissal
//! are device-side concerns; the scheduler only records the badge value.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::bus::{EventBus, PlatformEvent};
use crate::delivery::DeliveryError;
use crate::platform::{PermissionStatus, PlatformScheduler, PushToken, ScheduleRequest};

/// Public Expo push endpoint.
pub const DEFAULT_EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// ExpoConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ExpoConfig {
    /// Push endpoint URL.
    pub url: String,
    /// Device token the notifications are addressed to.
    pub token: PushToken,
}

impl ExpoConfig {
    pub fn new(token: PushToken) -> Self {
        Self {
            url: DEFAULT_EXPO_PUSH_URL.to_string(),
            token,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PushResponse {
    data: PushTicket,
}

#[derive(Debug, Deserialize)]
struct PushTicket {
    status: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// ExpoPushScheduler
// ---------------------------------------------------------------------------

/// Sends device notifications through the Expo push service.
///
/// Device-side callbacks (foreground receipt, taps) arrive through the host
/// and are forwarded with [`ingest`](ExpoPushScheduler::ingest).
pub struct ExpoPushScheduler {
    client: reqwest::Client,
    config: ExpoConfig,
    bus: EventBus,
    badge: AtomicU32,
}

impl ExpoPushScheduler {
    pub fn new(config: ExpoConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            bus: EventBus::default(),
            badge: AtomicU32::new(0),
        })
    }

    /// Forward a device-side event to subscribers of [`events`](PlatformScheduler::events).
    pub fn ingest(&self, event: PlatformEvent) {
        self.bus.publish(event);
    }

    /// Last badge value requested by the app.
    pub fn badge_count(&self) -> u32 {
        self.badge.load(Ordering::Relaxed)
    }

    fn message_for(&self, request: &ScheduleRequest) -> serde_json::Value {
        serde_json::json!({
            "to": self.config.token.0,
            "title": request.title,
            "body": request.body,
            "data": request.data,
            "sound": if request.sound { Some("default") } else { None },
            "priority": "high",
        })
    }

    /// Post with retry, returning the ticket id.
    async fn deliver(&self, message: &serde_json::Value) -> Result<String, DeliveryError> {
        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(message).await {
                Ok(id) => return Ok(id),
                // A rejected message will be rejected again.
                Err(e @ DeliveryError::Rejected(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.config.url,
                        error = %e,
                        "Push delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(message).await {
            Ok(id) => Ok(id),
            Err(e) => {
                tracing::error!(url = %self.config.url, error = %e, "Push delivery failed after all retries");
                Err(e)
            }
        }
    }

    /// Execute a single POST and interpret the push ticket.
    async fn try_send(&self, message: &serde_json::Value) -> Result<String, DeliveryError> {
        let response = self.client.post(&self.config.url).json(message).send().await?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }

        let body: PushResponse = response.json().await?;
        if body.data.status != "ok" {
            return Err(DeliveryError::Rejected(
                body.data.message.unwrap_or(body.data.status),
            ));
        }
        Ok(body
            .data
            .id
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string()))
    }
}

#[async_trait]
impl PlatformScheduler for ExpoPushScheduler {
    async fn schedule(&self, request: ScheduleRequest) -> Result<String, DeliveryError> {
        if !request.delay.is_zero() {
            tokio::time::sleep(request.delay).await;
        }
        let message = self.message_for(&request);
        let id = self.deliver(&message).await?;
        tracing::info!(ticket = %id, title = %request.title, "Push notification sent");
        Ok(id)
    }

    async fn dismiss_all(&self) -> Result<(), DeliveryError> {
        tracing::debug!("dismiss_all is handled on the device for remote push");
        Ok(())
    }

    async fn set_badge_count(&self, count: u32) -> Result<(), DeliveryError> {
        self.badge.store(count, Ordering::Relaxed);
        Ok(())
    }

    async fn permission_status(&self) -> PermissionStatus {
        // Holding a token means the device granted permission when registering.
        PermissionStatus::Granted
    }

    async fn register_for_push(&self) -> Result<PushToken, DeliveryError> {
        Ok(self.config.token.clone())
    }

    fn events(&self) -> broadcast::Receiver<PlatformEvent> {
        self.bus.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
