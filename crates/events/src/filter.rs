//! Preference gate and toast styling.
//!
//! Both functions are pure: the same inputs always give the same answer
//! and nothing is touched.

use kudi_core::category::{Category, Subtype, ToastType};
use kudi_core::channels::Channel;
use kudi_store::NotificationPreferences;

/// Decide whether a notification may go out on `channel`.
///
/// The channel flag gates every category. Transactions additionally need
/// the master flag and, for sent/received/failed, the matching subtype
/// flag. Unknown categories are always allowed.
pub fn should_send(
    prefs: &NotificationPreferences,
    category: Category,
    channel: Channel,
    subtype: Option<Subtype>,
) -> bool {
    let channel_enabled = match channel {
        Channel::Push => prefs.push_enabled,
        Channel::Email => prefs.email_enabled,
        Channel::Sms => prefs.sms_enabled,
    };
    if !channel_enabled {
        return false;
    }

    match category {
        Category::Transaction => {
            if !prefs.transaction_alerts {
                return false;
            }
            match subtype {
                Some(Subtype::Sent) => prefs.sent_transaction_alerts,
                Some(Subtype::Received) => prefs.received_transaction_alerts,
                Some(Subtype::Failed) => prefs.failed_transaction_alerts,
                _ => true,
            }
        }
        Category::Security => prefs.security_alerts,
        Category::System => prefs.system_alerts,
        Category::Promotional => prefs.promotional_updates,
        Category::Unknown => true,
    }
}

/// Visual toast type for a category and optional subtype.
pub fn toast_type(category: Category, subtype: Option<Subtype>) -> ToastType {
    match (category, subtype) {
        (Category::Transaction, Some(Subtype::Failed)) => ToastType::Error,
        (Category::Transaction, Some(Subtype::Received)) => ToastType::Success,
        (Category::Transaction, _) => ToastType::Transaction,
        (Category::Security, Some(Subtype::Suspicious)) => ToastType::Warning,
        (Category::Security, _) => ToastType::Info,
        (Category::System, Some(Subtype::Maintenance)) => ToastType::Warning,
        (Category::System | Category::Promotional | Category::Unknown, _) => ToastType::Info,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use kudi_store::PreferenceKey;

    use super::*;

    const CATEGORIES: [Category; 5] = [
        Category::Transaction,
        Category::Security,
        Category::Promotional,
        Category::System,
        Category::Unknown,
    ];

    fn all_on() -> NotificationPreferences {
        let mut prefs = NotificationPreferences::default();
        for key in PreferenceKey::ALL {
            prefs.set(key, true);
        }
        prefs
    }

    #[test]
    fn everything_passes_when_all_flags_are_on() {
        let prefs = all_on();
        for category in CATEGORIES {
            assert!(should_send(&prefs, category, Channel::Push, None), "{category}");
        }
    }

    #[test]
    fn disabled_channel_blocks_every_category() {
        let mut prefs = all_on();
        prefs.set(PreferenceKey::SmsEnabled, false);
        for category in CATEGORIES {
            assert!(!should_send(&prefs, category, Channel::Sms, None));
            assert!(should_send(&prefs, category, Channel::Push, None));
        }
    }

    #[test]
    fn master_flags_block_their_category() {
        let cases = [
            (PreferenceKey::TransactionAlerts, Category::Transaction),
            (PreferenceKey::SecurityAlerts, Category::Security),
            (PreferenceKey::PromotionalUpdates, Category::Promotional),
            (PreferenceKey::SystemAlerts, Category::System),
        ];
        for (key, category) in cases {
            let mut prefs = all_on();
            prefs.set(key, false);
            assert!(!should_send(&prefs, category, Channel::Push, None), "{key}");
            assert!(should_send(&prefs, Category::Unknown, Channel::Push, None));
        }
    }

    #[test]
    fn transaction_master_flag_blocks_all_subtypes() {
        let mut prefs = all_on();
        prefs.set(PreferenceKey::TransactionAlerts, false);
        for subtype in [Subtype::Sent, Subtype::Received, Subtype::Failed, Subtype::Other] {
            assert!(!should_send(
                &prefs,
                Category::Transaction,
                Channel::Push,
                Some(subtype)
            ));
        }
    }

    #[test]
    fn subtype_flag_blocks_even_with_master_on() {
        let cases = [
            (PreferenceKey::SentTransactionAlerts, Subtype::Sent),
            (PreferenceKey::ReceivedTransactionAlerts, Subtype::Received),
            (PreferenceKey::FailedTransactionAlerts, Subtype::Failed),
        ];
        for (key, subtype) in cases {
            let mut prefs = all_on();
            prefs.set(key, false);
            assert!(prefs.transaction_alerts);
            assert!(!should_send(
                &prefs,
                Category::Transaction,
                Channel::Push,
                Some(subtype)
            ));
            // Other subtypes and untagged transactions still pass.
            assert!(should_send(&prefs, Category::Transaction, Channel::Push, None));
        }
    }

    #[test]
    fn should_send_is_deterministic() {
        let mut prefs = all_on();
        prefs.set(PreferenceKey::ReceivedTransactionAlerts, false);
        let before = prefs;

        let first = should_send(&prefs, Category::Transaction, Channel::Push, Some(Subtype::Received));
        for _ in 0..10 {
            assert_eq!(
                should_send(&prefs, Category::Transaction, Channel::Push, Some(Subtype::Received)),
                first
            );
        }
        assert_eq!(prefs, before);
    }

    #[test]
    fn toast_type_mapping() {
        assert_eq!(toast_type(Category::Transaction, Some(Subtype::Failed)), ToastType::Error);
        assert_eq!(toast_type(Category::Transaction, Some(Subtype::Received)), ToastType::Success);
        assert_eq!(toast_type(Category::Transaction, Some(Subtype::Sent)), ToastType::Transaction);
        assert_eq!(toast_type(Category::Transaction, None), ToastType::Transaction);
        assert_eq!(toast_type(Category::Security, Some(Subtype::Suspicious)), ToastType::Warning);
        assert_eq!(toast_type(Category::Security, Some(Subtype::Login)), ToastType::Info);
        assert_eq!(toast_type(Category::System, Some(Subtype::Maintenance)), ToastType::Warning);
        assert_eq!(toast_type(Category::Promotional, Some(Subtype::Offer)), ToastType::Info);
        assert_eq!(toast_type(Category::Unknown, None), ToastType::Info);
    }
}
