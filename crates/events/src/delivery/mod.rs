//! External delivery of device notifications.
//!
//! [`expo`] pushes through an Expo-compatible HTTP push service. The
//! in-process scheduler lives in [`crate::platform`].

pub mod expo;

/// Error type for platform scheduling and push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push service returned a non-2xx status code.
    #[error("Push service returned HTTP {0}")]
    HttpStatus(u16),

    /// The push service accepted the request but rejected the message.
    #[error("Push rejected: {0}")]
    Rejected(String),

    /// The user has not granted notification permission.
    #[error("Notification permission not granted")]
    PermissionDenied,

    /// The scheduler cannot perform this operation.
    #[error("Unsupported by this scheduler: {0}")]
    Unsupported(&'static str),
}
