//! Well-known delivery channel names.
//!
//! Only [`Channel::Push`] is wired to a scheduler; email and SMS exist as
//! preference gates so that a disabled channel can block a category.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Push or local notification on the device.
pub const CHANNEL_PUSH: &str = "push";

/// Email notification.
pub const CHANNEL_EMAIL: &str = "email";

/// SMS notification.
pub const CHANNEL_SMS: &str = "sms";

/// Delivery medium for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Push,
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Push => CHANNEL_PUSH,
            Channel::Email => CHANNEL_EMAIL,
            Channel::Sms => CHANNEL_SMS,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CHANNEL_PUSH => Ok(Channel::Push),
            CHANNEL_EMAIL => Ok(Channel::Email),
            CHANNEL_SMS => Ok(Channel::Sms),
            other => Err(CoreError::Validation(format!("unknown channel '{other}'"))),
        }
    }
}
