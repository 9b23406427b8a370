//! Kudi notification dispatch.
//!
//! - [`Dispatcher`]: preference-filtered fan-out from feature code to
//!   in-process listeners and the platform scheduler.
//! - [`filter`]: the pure `should_send` gate and toast-type mapping.
//! - [`NotificationPayload`]: the transient envelope and its builders.
//! - [`PlatformScheduler`]: device notification seam, with the in-process
//!   [`LocalScheduler`] and the HTTP-backed [`ExpoPushScheduler`].
//! - [`EventBus`]: broadcast of received/tapped platform notifications.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod filter;
pub mod payload;
pub mod platform;

pub use bus::{DeliveredNotification, EventBus, NotificationResponse, PlatformEvent};
pub use delivery::expo::{ExpoConfig, ExpoPushScheduler};
pub use delivery::DeliveryError;
pub use dispatcher::{Dispatch, Dispatcher, Listener, Subscription, DEFAULT_PUSH_DELAY};
pub use filter::{should_send, toast_type};
pub use payload::{
    NotificationPayload, SecurityEvent, SecurityNotice, TransactionKind, TransactionNotice,
};
pub use platform::{
    LocalScheduler, PermissionStatus, PlatformScheduler, PushToken, ScheduleRequest,
    DELIVERED_HISTORY_LIMIT,
};
