//! Notification preference model and its persistent store.
//!
//! Preferences are a flat record of boolean flags saved as one camelCase
//! JSON blob under [`PREFERENCES_KEY`]. On load the stored flags are laid
//! over the built-in defaults key by key, so flags added after a record was
//! saved come back with their default value.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use kudi_core::error::CoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::kv::KeyValueStore;

/// Storage key holding the serialized preference record.
pub const PREFERENCES_KEY: &str = "notification_preferences";

// ---------------------------------------------------------------------------
// NotificationPreferences
// ---------------------------------------------------------------------------

/// Which notification channels and categories the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    // Channels
    pub push_enabled: bool,
    pub email_enabled: bool,
    pub sms_enabled: bool,

    // Categories
    pub transaction_alerts: bool,
    /// Treated as always-on by product policy, but still a settable flag.
    pub security_alerts: bool,
    pub promotional_updates: bool,
    pub system_alerts: bool,

    // Transaction subtypes
    pub sent_transaction_alerts: bool,
    pub received_transaction_alerts: bool,
    pub failed_transaction_alerts: bool,

    // Device behaviour
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub badge_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            email_enabled: false,
            sms_enabled: false,
            transaction_alerts: true,
            security_alerts: true,
            promotional_updates: false,
            system_alerts: true,
            sent_transaction_alerts: true,
            received_transaction_alerts: true,
            failed_transaction_alerts: true,
            sound_enabled: true,
            vibration_enabled: true,
            badge_enabled: true,
        }
    }
}

impl NotificationPreferences {
    /// Read a single flag.
    pub fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::PushEnabled => self.push_enabled,
            PreferenceKey::EmailEnabled => self.email_enabled,
            PreferenceKey::SmsEnabled => self.sms_enabled,
            PreferenceKey::TransactionAlerts => self.transaction_alerts,
            PreferenceKey::SecurityAlerts => self.security_alerts,
            PreferenceKey::PromotionalUpdates => self.promotional_updates,
            PreferenceKey::SystemAlerts => self.system_alerts,
            PreferenceKey::SentTransactionAlerts => self.sent_transaction_alerts,
            PreferenceKey::ReceivedTransactionAlerts => self.received_transaction_alerts,
            PreferenceKey::FailedTransactionAlerts => self.failed_transaction_alerts,
            PreferenceKey::SoundEnabled => self.sound_enabled,
            PreferenceKey::VibrationEnabled => self.vibration_enabled,
            PreferenceKey::BadgeEnabled => self.badge_enabled,
        }
    }

    /// Overwrite a single flag.
    pub fn set(&mut self, key: PreferenceKey, value: bool) {
        let slot = match key {
            PreferenceKey::PushEnabled => &mut self.push_enabled,
            PreferenceKey::EmailEnabled => &mut self.email_enabled,
            PreferenceKey::SmsEnabled => &mut self.sms_enabled,
            PreferenceKey::TransactionAlerts => &mut self.transaction_alerts,
            PreferenceKey::SecurityAlerts => &mut self.security_alerts,
            PreferenceKey::PromotionalUpdates => &mut self.promotional_updates,
            PreferenceKey::SystemAlerts => &mut self.system_alerts,
            PreferenceKey::SentTransactionAlerts => &mut self.sent_transaction_alerts,
            PreferenceKey::ReceivedTransactionAlerts => &mut self.received_transaction_alerts,
            PreferenceKey::FailedTransactionAlerts => &mut self.failed_transaction_alerts,
            PreferenceKey::SoundEnabled => &mut self.sound_enabled,
            PreferenceKey::VibrationEnabled => &mut self.vibration_enabled,
            PreferenceKey::BadgeEnabled => &mut self.badge_enabled,
        };
        *slot = value;
    }

    /// Lay the boolean fields of a stored JSON object over the defaults.
    ///
    /// Keys that are missing, unknown, or not booleans are ignored, so the
    /// result is always a complete record.
    pub fn merged_over_defaults(stored: &serde_json::Value) -> Self {
        let mut prefs = Self::default();
        let Some(object) = stored.as_object() else {
            tracing::warn!("Stored preferences are not a JSON object, using defaults");
            return prefs;
        };

        for key in PreferenceKey::ALL {
            match object.get(key.as_str()) {
                Some(serde_json::Value::Bool(value)) => prefs.set(key, *value),
                Some(other) => {
                    tracing::warn!(key = %key, value = %other, "Ignoring non-boolean preference");
                }
                None => {}
            }
        }
        prefs
    }
}

// ---------------------------------------------------------------------------
// PreferenceKey
// ---------------------------------------------------------------------------

/// Name of one flag in [`NotificationPreferences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    PushEnabled,
    EmailEnabled,
    SmsEnabled,
    TransactionAlerts,
    SecurityAlerts,
    PromotionalUpdates,
    SystemAlerts,
    SentTransactionAlerts,
    ReceivedTransactionAlerts,
    FailedTransactionAlerts,
    SoundEnabled,
    VibrationEnabled,
    BadgeEnabled,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 13] = [
        PreferenceKey::PushEnabled,
        PreferenceKey::EmailEnabled,
        PreferenceKey::SmsEnabled,
        PreferenceKey::TransactionAlerts,
        PreferenceKey::SecurityAlerts,
        PreferenceKey::PromotionalUpdates,
        PreferenceKey::SystemAlerts,
        PreferenceKey::SentTransactionAlerts,
        PreferenceKey::ReceivedTransactionAlerts,
        PreferenceKey::FailedTransactionAlerts,
        PreferenceKey::SoundEnabled,
        PreferenceKey::VibrationEnabled,
        PreferenceKey::BadgeEnabled,
    ];

    /// The camelCase field name used in the stored blob.
    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceKey::PushEnabled => "pushEnabled",
            PreferenceKey::EmailEnabled => "emailEnabled",
            PreferenceKey::SmsEnabled => "smsEnabled",
            PreferenceKey::TransactionAlerts => "transactionAlerts",
            PreferenceKey::SecurityAlerts => "securityAlerts",
            PreferenceKey::PromotionalUpdates => "promotionalUpdates",
            PreferenceKey::SystemAlerts => "systemAlerts",
            PreferenceKey::SentTransactionAlerts => "sentTransactionAlerts",
            PreferenceKey::ReceivedTransactionAlerts => "receivedTransactionAlerts",
            PreferenceKey::FailedTransactionAlerts => "failedTransactionAlerts",
            PreferenceKey::SoundEnabled => "soundEnabled",
            PreferenceKey::VibrationEnabled => "vibrationEnabled",
            PreferenceKey::BadgeEnabled => "badgeEnabled",
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreferenceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPreferenceKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PreferenceStore
// ---------------------------------------------------------------------------

/// Owner of the live preference record and its durable copy.
///
/// Reads are synchronous snapshots. Mutations are serialized through an
/// async mutex and always write the full record, so concurrent toggles
/// resolve to the last write.
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<NotificationPreferences>,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    /// Load preferences from `storage`, falling back to defaults when the
    /// blob is absent or unreadable.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let prefs = match storage.get(PREFERENCES_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => NotificationPreferences::merged_over_defaults(&value),
                Err(e) => {
                    tracing::error!(error = %e, "Stored preferences are corrupt, using defaults");
                    NotificationPreferences::default()
                }
            },
            Ok(None) => {
                tracing::debug!("No stored preferences, using defaults");
                NotificationPreferences::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read preferences, using defaults");
                NotificationPreferences::default()
            }
        };

        Self {
            storage,
            current: RwLock::new(prefs),
            write_lock: Mutex::new(()),
        }
    }

    /// Current preference record.
    pub fn snapshot(&self) -> NotificationPreferences {
        *self.current.read()
    }

    /// Set one flag and persist the whole record. Returns the new snapshot.
    pub async fn update(&self, key: PreferenceKey, value: bool) -> NotificationPreferences {
        let _guard = self.write_lock.lock().await;
        let prefs = {
            let mut current = self.current.write();
            current.set(key, value);
            *current
        };
        tracing::debug!(key = %key, value, "Preference updated");
        self.persist(&prefs).await;
        prefs
    }

    /// Replace the record with the defaults, in memory and in storage.
    pub async fn reset_to_defaults(&self) -> NotificationPreferences {
        let _guard = self.write_lock.lock().await;
        let prefs = NotificationPreferences::default();
        *self.current.write() = prefs;
        tracing::info!("Preferences reset to defaults");
        self.persist(&prefs).await;
        prefs
    }

    async fn persist(&self, prefs: &NotificationPreferences) {
        let raw = match serde_json::to_string(prefs) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode preferences");
                return;
            }
        };
        if let Err(e) = self.storage.set(PREFERENCES_KEY, raw).await {
            tracing::error!(error = %e, "Failed to save preferences");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::kv::MemoryStore;

    /// Storage whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::InvalidKey("broken".into()))
        }
        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey("broken".into()))
        }
        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey("broken".into()))
        }
    }

    async fn stored_json(storage: &MemoryStore) -> serde_json::Value {
        let raw = storage.get(PREFERENCES_KEY).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn load_without_stored_blob_uses_defaults() {
        let store = PreferenceStore::load(Arc::new(MemoryStore::new())).await;
        assert_eq!(store.snapshot(), NotificationPreferences::default());
    }

    #[tokio::test]
    async fn load_merges_stored_values_over_defaults() {
        let storage = Arc::new(MemoryStore::new());
        // Saved by an older build that predates the subtype flags.
        storage
            .set(
                PREFERENCES_KEY,
                r#"{"pushEnabled":false,"promotionalUpdates":true,"legacyFlag":true}"#.into(),
            )
            .await
            .unwrap();

        let prefs = PreferenceStore::load(storage).await.snapshot();

        assert!(!prefs.push_enabled);
        assert!(prefs.promotional_updates);
        assert!(prefs.received_transaction_alerts);
        assert!(prefs.failed_transaction_alerts);
        assert!(!prefs.sms_enabled);
    }

    #[tokio::test]
    async fn non_boolean_values_fall_back_to_default() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(PREFERENCES_KEY, r#"{"soundEnabled":"no","badgeEnabled":false}"#.into())
            .await
            .unwrap();

        let prefs = PreferenceStore::load(storage).await.snapshot();
        assert!(prefs.sound_enabled);
        assert!(!prefs.badge_enabled);
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_defaults() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(PREFERENCES_KEY, "{not json".into()).await.unwrap();

        let store = PreferenceStore::load(storage).await;
        assert_eq!(store.snapshot(), NotificationPreferences::default());
    }

    #[tokio::test]
    async fn update_persists_full_record() {
        let storage = Arc::new(MemoryStore::new());
        let store = PreferenceStore::load(storage.clone()).await;

        let prefs = store.update(PreferenceKey::SoundEnabled, false).await;
        assert!(!prefs.sound_enabled);

        let saved = stored_json(&storage).await;
        assert_eq!(saved["soundEnabled"], false);
        assert_eq!(saved.as_object().unwrap().len(), PreferenceKey::ALL.len());
    }

    #[tokio::test]
    async fn rapid_toggles_leave_last_write() {
        let storage = Arc::new(MemoryStore::new());
        let store = PreferenceStore::load(storage.clone()).await;

        for value in [false, true, false] {
            store.update(PreferenceKey::SystemAlerts, value).await;
        }

        assert!(!store.snapshot().system_alerts);
        assert_eq!(stored_json(&storage).await["systemAlerts"], false);
    }

    #[tokio::test]
    async fn reset_to_defaults_overwrites_storage() {
        let storage = Arc::new(MemoryStore::new());
        let store = PreferenceStore::load(storage.clone()).await;
        store.update(PreferenceKey::PushEnabled, false).await;

        let prefs = store.reset_to_defaults().await;
        assert_eq!(prefs, NotificationPreferences::default());
        assert_eq!(stored_json(&storage).await["pushEnabled"], true);
    }

    #[tokio::test]
    async fn storage_failures_never_escape() {
        let store = PreferenceStore::load(Arc::new(BrokenStore)).await;
        assert_eq!(store.snapshot(), NotificationPreferences::default());

        let prefs = store.update(PreferenceKey::SmsEnabled, true).await;
        assert!(prefs.sms_enabled);
        assert!(store.snapshot().sms_enabled);
    }

    #[test]
    fn preference_keys_parse_from_storage_names() {
        for key in PreferenceKey::ALL {
            assert_eq!(key.as_str().parse::<PreferenceKey>().unwrap(), key);
        }
        assert_matches!(
            "darkMode".parse::<PreferenceKey>(),
            Err(CoreError::UnknownPreferenceKey(name)) if name == "darkMode"
        );
    }

    #[test]
    fn serialized_field_names_match_keys() {
        let value = serde_json::to_value(NotificationPreferences::default()).unwrap();
        for key in PreferenceKey::ALL {
            assert!(value.get(key.as_str()).is_some(), "missing {key}");
        }
    }
}
