//! The transient notification envelope and the category-specific builders
//! that compose its copy.

use kudi_core::category::{Category, Subtype};
use kudi_core::money::format_naira;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A notification on its way through the dispatcher. Never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,
    pub title: String,
    pub message: String,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl NotificationPayload {
    pub fn new(category: Category, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            subtype: None,
            title: title.into(),
            message: message.into(),
            data: empty_object(),
        }
    }

    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Amount carried in `data.amount`, if any.
    pub fn amount(&self) -> Option<f64> {
        self.data.get("amount").and_then(serde_json::Value::as_f64)
    }

    /// Build a transaction notification.
    pub fn transaction(notice: &TransactionNotice) -> Self {
        let amount = format_naira(notice.amount);
        let counterparty = notice.counterparty.as_deref();

        let (title, message) = match notice.kind {
            TransactionKind::Sent => (
                "Money Sent",
                match counterparty {
                    Some(to) => format!("You sent {amount} to {to}"),
                    None => format!("You sent {amount}"),
                },
            ),
            TransactionKind::Received => (
                "Money Received",
                match counterparty {
                    Some(from) => format!("You received {amount} from {from}"),
                    None => format!("You received {amount}"),
                },
            ),
            TransactionKind::Failed => {
                let mut message = match counterparty {
                    Some(to) => format!("Your transfer of {amount} to {to} failed"),
                    None => format!("Your transaction of {amount} failed"),
                };
                if let Some(reason) = &notice.reason {
                    message.push_str(": ");
                    message.push_str(reason);
                }
                ("Transaction Failed", message)
            }
        };

        Self::new(Category::Transaction, title, message)
            .with_subtype(notice.kind.subtype())
            .with_data(json!({
                "type": notice.kind.subtype(),
                "amount": notice.amount,
                "counterparty": notice.counterparty,
                "reference": notice.reference,
            }))
    }

    /// Build a security notification.
    pub fn security(notice: &SecurityNotice) -> Self {
        let detail = notice.detail.as_deref();
        let (title, message) = match notice.event {
            SecurityEvent::Login => (
                "New Login Detected",
                match detail {
                    Some(device) => format!("Your account was accessed from {device}"),
                    None => "A new login to your account was detected".to_string(),
                },
            ),
            SecurityEvent::PasswordChanged => (
                "Password Changed",
                "Your password was changed. If this wasn't you, contact support immediately"
                    .to_string(),
            ),
            SecurityEvent::PinChanged => (
                "Transaction PIN Changed",
                "Your transaction PIN was updated successfully".to_string(),
            ),
            SecurityEvent::Suspicious => (
                "Suspicious Activity Detected",
                match detail {
                    Some(what) => format!("We noticed unusual activity: {what}. Please review your account"),
                    None => "We noticed unusual activity on your account. Please review it"
                        .to_string(),
                },
            ),
        };

        Self::new(Category::Security, title, message)
            .with_subtype(notice.event.subtype())
            .with_data(json!({ "type": notice.event.subtype(), "detail": notice.detail }))
    }

    /// Build a promotional notification, optionally pointing at a screen.
    pub fn promotion(
        title: impl Into<String>,
        message: impl Into<String>,
        screen: Option<&str>,
    ) -> Self {
        let data = match screen {
            Some(screen) => json!({ "type": Subtype::Offer, "screen": screen }),
            None => json!({ "type": Subtype::Offer }),
        };
        Self::new(Category::Promotional, title, message)
            .with_subtype(Subtype::Offer)
            .with_data(data)
    }

    /// Build a system notification.
    pub fn system(
        title: impl Into<String>,
        message: impl Into<String>,
        subtype: Option<Subtype>,
    ) -> Self {
        let payload = Self::new(Category::System, title, message);
        match subtype {
            Some(subtype) => payload
                .with_subtype(subtype)
                .with_data(json!({ "type": subtype })),
            None => payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder inputs
// ---------------------------------------------------------------------------

/// Outcome of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Sent,
    Received,
    Failed,
}

impl TransactionKind {
    pub fn subtype(self) -> Subtype {
        match self {
            TransactionKind::Sent => Subtype::Sent,
            TransactionKind::Received => Subtype::Received,
            TransactionKind::Failed => Subtype::Failed,
        }
    }
}

/// Facts about a transaction result screen's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionNotice {
    pub kind: TransactionKind,
    /// Amount in naira.
    pub amount: f64,
    /// Recipient for sent/failed, sender for received (e.g. `@chukwudi`).
    #[serde(default)]
    pub counterparty: Option<String>,
    /// Session or reference id of the transaction.
    #[serde(default)]
    pub reference: Option<String>,
    /// Failure reason, appended to the message of failed transactions.
    #[serde(default)]
    pub reason: Option<String>,
}

impl TransactionNotice {
    pub fn new(kind: TransactionKind, amount: f64) -> Self {
        Self {
            kind,
            amount,
            counterparty: None,
            reference: None,
            reason: None,
        }
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Account-security occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEvent {
    Login,
    PasswordChanged,
    PinChanged,
    Suspicious,
}

impl SecurityEvent {
    pub fn subtype(self) -> Subtype {
        match self {
            SecurityEvent::Login => Subtype::Login,
            SecurityEvent::PasswordChanged => Subtype::PasswordChanged,
            SecurityEvent::PinChanged => Subtype::PinChanged,
            SecurityEvent::Suspicious => Subtype::Suspicious,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityNotice {
    pub event: SecurityEvent,
    /// Device, location, or description of the activity.
    #[serde(default)]
    pub detail: Option<String>,
}

impl SecurityNotice {
    pub fn new(event: SecurityEvent) -> Self {
        Self { event, detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
