//! Notification classification: business category, finer-grained subtype,
//! and the visual type a toast is rendered with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Business classification of a notification.
///
/// Anything a producer sends that is not one of the four known categories
/// deserializes to [`Category::Unknown`], which the preference filter always
/// lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transaction,
    Security,
    Promotional,
    System,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Transaction => "transaction",
            Category::Security => "security",
            Category::Promotional => "promotional",
            Category::System => "system",
            Category::Unknown => "unknown",
        }
    }

    /// Icon name shown next to a stored notification of this category.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Transaction => "swap-horizontal",
            Category::Security => "shield-checkmark",
            Category::Promotional => "gift",
            Category::System => "information-circle",
            Category::Unknown => "notifications",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer-grained tag within a category.
///
/// `Sent`, `Received` and `Failed` are the transaction subtypes that carry
/// their own preference flags. The remaining variants only affect copy and
/// toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    Sent,
    Received,
    Failed,
    Login,
    PasswordChanged,
    PinChanged,
    Suspicious,
    Offer,
    Maintenance,
    Update,
    #[serde(other)]
    Other,
}

impl Subtype {
    pub fn as_str(self) -> &'static str {
        match self {
            Subtype::Sent => "sent",
            Subtype::Received => "received",
            Subtype::Failed => "failed",
            Subtype::Login => "login",
            Subtype::PasswordChanged => "password_changed",
            Subtype::PinChanged => "pin_changed",
            Subtype::Suspicious => "suspicious",
            Subtype::Offer => "offer",
            Subtype::Maintenance => "maintenance",
            Subtype::Update => "update",
            Subtype::Other => "other",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual style of an in-app toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastType {
    Success,
    Error,
    Warning,
    Info,
    Transaction,
}
