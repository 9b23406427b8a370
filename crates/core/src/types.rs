/// Toast and stored-notification identifiers are time-ordered UUIDv7s.
pub type NotificationId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh time-ordered notification id.
pub fn new_notification_id() -> NotificationId {
    uuid::Uuid::now_v7()
}
