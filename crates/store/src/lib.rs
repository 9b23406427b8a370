//! Durable key-value storage and the notification preference store.
//!
//! - [`KeyValueStore`]: async storage seam with [`MemoryStore`] and
//!   [`FileStore`] backends.
//! - [`PreferenceStore`]: loads, merges, mutates and persists
//!   [`NotificationPreferences`] as a single JSON blob.

pub mod error;
pub mod kv;
pub mod preferences;

pub use error::StoreError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use preferences::{NotificationPreferences, PreferenceKey, PreferenceStore, PREFERENCES_KEY};
