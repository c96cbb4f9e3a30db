//! Push queue settings and delivery status.
//!
//! A push queue forwards each message to its subscriber URLs instead of
//! waiting for consumers to reserve it.

use crate::message::MessageId;
use serde::{Deserialize, Serialize};

/// Default number of delivery retries per subscriber.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default seconds between delivery retries.
pub const DEFAULT_RETRIES_DELAY_SECS: u64 = 60;

/// How pushed messages are fanned out to subscribers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushType {
    /// Deliver each message to one subscriber, trying them in order
    Unicast,
    /// Deliver each message to every subscriber
    #[default]
    Multicast,
}

/// Push settings sent with a queue update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConfig {
    pub push_type: PushType,
    pub retries: u32,
    pub retries_delay: u64,
    /// Ordered subscriber endpoint URLs
    pub subscribers: Vec<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            push_type: PushType::default(),
            retries: DEFAULT_RETRIES,
            retries_delay: DEFAULT_RETRIES_DELAY_SECS,
            subscribers: Vec::new(),
        }
    }
}

impl PushConfig {
    /// Create new push settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_push_type(mut self, push_type: PushType) -> Self {
        self.push_type = push_type;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retries_delay(mut self, seconds: u64) -> Self {
        self.retries_delay = seconds;
        self
    }

    /// Append a subscriber URL
    pub fn with_subscriber(mut self, url: impl Into<String>) -> Self {
        self.subscribers.push(url.into());
        self
    }
}

/// Delivery status of one pushed message for one subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushInfo {
    /// Delivery attempt identifier
    pub id: MessageId,
    /// Subscriber endpoint
    pub url: String,
    /// HTTP status returned by the subscriber on the last attempt
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub retries_remaining: u32,
    #[serde(default)]
    pub retries_delay: u64,
}

#[cfg(test)]
#[path = "push_tests.rs"]
mod tests;
