//! Notification center: the list behind the bell icon.
//!
//! Entries are kept newest first, flip to read on explicit request, and
//! leave only when deleted. The unread count is always computed from the
//! list itself.

use chrono::{Duration as ChronoDuration, Utc};
use kudi_core::category::Category;
use kudi_core::types::{new_notification_id, NotificationId, Timestamp};
use parking_lot::RwLock;
use serde::Serialize;

/// Time-of-day label format, e.g. `3:04 PM`.
const TIME_LABEL_FORMAT: &str = "%-I:%M %p";

/// Date label format, e.g. `Oct 19, 2026`.
const DATE_LABEL_FORMAT: &str = "%b %-d, %Y";

/// An entry in the notification center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub id: NotificationId,
    pub category: Category,
    pub title: String,
    pub message: String,
    pub timestamp_label: String,
    pub date_label: String,
    pub created_at: Timestamp,
    pub read: bool,
    pub icon: Option<String>,
    pub amount: Option<f64>,
    pub actionable: bool,
}

impl StoredNotification {
    /// `Today`, `Yesterday`, or the date label, relative to `now`.
    pub fn date_group(&self, now: Timestamp) -> String {
        let day = self.created_at.date_naive();
        let today = now.date_naive();
        if day == today {
            "Today".to_string()
        } else if day + ChronoDuration::days(1) == today {
            "Yesterday".to_string()
        } else {
            self.date_label.clone()
        }
    }
}

/// Input for [`NotificationCenter::add`].
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub category: Category,
    pub title: String,
    pub message: String,
    pub icon: Option<String>,
    pub amount: Option<f64>,
    pub actionable: bool,
    /// Defaults to now.
    pub created_at: Option<Timestamp>,
    /// Derived from `created_at` when absent.
    pub timestamp_label: Option<String>,
    /// Derived from `created_at` when absent.
    pub date_label: Option<String>,
}

impl NewNotification {
    pub fn new(category: Category, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            title: title.into(),
            message: message.into(),
            icon: None,
            amount: None,
            actionable: false,
            created_at: None,
            timestamp_label: None,
            date_label: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn actionable(mut self, actionable: bool) -> Self {
        self.actionable = actionable;
        self
    }

    pub fn created_at(mut self, at: Timestamp) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// In-memory notification list. Share it by `Arc`.
#[derive(Default)]
pub struct NotificationCenter {
    entries: RwLock<Vec<StoredNotification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the head of the list and return the new id.
    pub fn add(&self, new: NewNotification) -> NotificationId {
        let created_at = new.created_at.unwrap_or_else(Utc::now);
        let entry = StoredNotification {
            id: new_notification_id(),
            category: new.category,
            title: new.title,
            message: new.message,
            timestamp_label: new
                .timestamp_label
                .unwrap_or_else(|| created_at.format(TIME_LABEL_FORMAT).to_string()),
            date_label: new
                .date_label
                .unwrap_or_else(|| created_at.format(DATE_LABEL_FORMAT).to_string()),
            created_at,
            read: false,
            icon: new.icon,
            amount: new.amount,
            actionable: new.actionable,
        };
        let id = entry.id;
        self.entries.write().insert(0, entry);
        tracing::debug!(%id, "Stored notification added");
        id
    }

    /// All entries, newest first.
    pub fn list(&self) -> Vec<StoredNotification> {
        self.entries.read().clone()
    }

    pub fn get(&self, id: NotificationId) -> Option<StoredNotification> {
        self.entries.read().iter().find(|n| n.id == id).cloned()
    }

    /// Returns `true` if the entry exists.
    pub fn mark_as_read(&self, id: NotificationId) -> bool {
        match self.entries.write().iter_mut().find(|n| n.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    /// Mark every entry read, returning how many were unread.
    pub fn mark_all_as_read(&self) -> usize {
        let mut entries = self.entries.write();
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|n| !n.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    /// Remove an entry permanently. Returns `true` if it existed.
    pub fn delete(&self, id: NotificationId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn unread_count(&self) -> usize {
        self.entries.read().iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Entries split into date sections, newest section first.
    pub fn grouped(&self, now: Timestamp) -> Vec<(String, Vec<StoredNotification>)> {
        let mut groups: Vec<(String, Vec<StoredNotification>)> = Vec::new();
        for entry in self.entries.read().iter() {
            let label = entry.date_group(now);
            if let Some((current, items)) = groups.last_mut() {
                if *current == label {
                    items.push(entry.clone());
                    continue;
                }
            }
            groups.push((label, vec![entry.clone()]));
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
