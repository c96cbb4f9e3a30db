//! Message types and core domain identifiers.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Default reservation timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default visibility delay in seconds.
pub const DEFAULT_DELAY_SECS: u64 = 0;

/// Default expiration in seconds (seven days).
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 604_800;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Queue name, unique within a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "queue_name".to_string(),
            });
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidFormat {
                field: "queue_name".to_string(),
                message: "control characters are not allowed".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Generate a random, unique queue name
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Server-assigned message identifier.
///
/// Zero marks a message that has not been enqueued yet. The service sends
/// identifiers either as JSON numbers or as numeric strings; both decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    /// Identifier of a message that was never submitted
    pub const UNASSIGNED: MessageId = MessageId(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether the service has assigned this identifier
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "message_id".to_string(),
                message: e.to_string(),
            })
    }
}

impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString {
            Number(u64),
            String(String),
        }

        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(id) => Ok(Self(id)),
            NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Per-message settings applied when a message is enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOptions {
    /// Seconds a reservation hides the message from other consumers
    pub timeout: u64,
    /// Seconds before the message becomes visible after being added
    pub delay: u64,
    /// Seconds until an unconsumed message is discarded
    pub expires_in: u64,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            delay: DEFAULT_DELAY_SECS,
            expires_in: DEFAULT_EXPIRES_IN_SECS,
        }
    }
}

impl MessageOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: u64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = seconds;
        self
    }
}

/// A queue message, either awaiting submission or retrieved from the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
    pub timeout: u64,
    pub delay: u64,
    pub expires_in: u64,
    pub id: MessageId,
    /// Times the service has handed this message out; 0 for local messages
    pub reserved_count: u64,
}

impl Message {
    /// Create an unsubmitted message with default settings
    pub fn new(body: impl Into<String>) -> Self {
        Self::with_options(body, MessageOptions::default())
    }

    /// Create an unsubmitted message with explicit settings
    pub fn with_options(body: impl Into<String>, options: MessageOptions) -> Self {
        Self {
            body: body.into(),
            timeout: options.timeout,
            delay: options.delay,
            expires_in: options.expires_in,
            id: MessageId::UNASSIGNED,
            reserved_count: 0,
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: u64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = seconds;
        self
    }

    /// Whether the message has been accepted by the service
    pub fn is_submitted(&self) -> bool {
        self.id.is_assigned()
    }

    /// Settings this message was created with
    pub fn options(&self) -> MessageOptions {
        MessageOptions {
            timeout: self.timeout,
            delay: self.delay,
            expires_in: self.expires_in,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
