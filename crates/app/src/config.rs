use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kudi_events::{
    DeliveryError, ExpoConfig, ExpoPushScheduler, LocalScheduler, PlatformScheduler, PushToken,
    DEFAULT_PUSH_DELAY,
};
use kudi_store::{FileStore, KeyValueStore, MemoryStore};

use crate::toast::DEFAULT_TOAST_DURATION;

/// Notification subsystem configuration loaded from environment variables.
///
/// Every field has a default suitable for local development; unparsable
/// values fall back to the default with a warning.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Directory for durable storage; `None` keeps everything in memory.
    pub storage_dir: Option<PathBuf>,
    /// How long a toast stays visible (default: 4000 ms).
    pub toast_duration: Duration,
    /// Offset before the device notification (default: 2 s).
    pub push_delay: Duration,
    /// Expo push endpoint; with a token set, remote push replaces the local
    /// scheduler.
    pub expo_push_url: Option<String>,
    /// Device push token for remote push.
    pub expo_push_token: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            toast_duration: DEFAULT_TOAST_DURATION,
            push_delay: DEFAULT_PUSH_DELAY,
            expo_push_url: None,
            expo_push_token: None,
        }
    }
}

impl NotifyConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                          |
    /// |--------------------------|----------------------------------|
    /// | `KUDI_STORAGE_DIR`       | unset (in-memory storage)        |
    /// | `KUDI_TOAST_DURATION_MS` | `4000`                           |
    /// | `KUDI_PUSH_DELAY_SECS`   | `2`                              |
    /// | `KUDI_EXPO_PUSH_URL`     | Expo public endpoint             |
    /// | `KUDI_EXPO_PUSH_TOKEN`   | unset (local scheduler)          |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let toast_duration = parse_env::<u64>("KUDI_TOAST_DURATION_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.toast_duration);

        let push_delay = parse_env::<u64>("KUDI_PUSH_DELAY_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.push_delay);

        Self {
            storage_dir: non_empty_env("KUDI_STORAGE_DIR").map(PathBuf::from),
            toast_duration,
            push_delay,
            expo_push_url: non_empty_env("KUDI_EXPO_PUSH_URL"),
            expo_push_token: non_empty_env("KUDI_EXPO_PUSH_TOKEN"),
        }
    }

    /// Storage backend selected by `storage_dir`.
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        match &self.storage_dir {
            Some(dir) => Arc::new(FileStore::new(dir.clone())),
            None => Arc::new(MemoryStore::new()),
        }
    }

    /// Device scheduler: Expo push when a token is configured, otherwise
    /// the in-process scheduler.
    pub fn scheduler(&self) -> Result<Arc<dyn PlatformScheduler>, DeliveryError> {
        match &self.expo_push_token {
            Some(token) => {
                let mut expo = ExpoConfig::new(PushToken(token.clone()));
                if let Some(url) = &self.expo_push_url {
                    expo = expo.with_url(url.clone());
                }
                Ok(Arc::new(ExpoPushScheduler::new(expo)?))
            }
            None => Ok(Arc::new(LocalScheduler::new())),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = non_empty_env(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}
