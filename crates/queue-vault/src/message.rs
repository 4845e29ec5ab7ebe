//! Message types and core domain identifiers for queue operations.

use crate::error::QueueError;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum queue name length
pub const QUEUE_NAME_MIN_LEN: usize = 3;

/// Maximum queue name length
pub const QUEUE_NAME_MAX_LEN: usize = 63;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Validated queue name with length and character restrictions.
///
/// Names are case-insensitive: input is normalized to ASCII lowercase, so
/// `Orders` and `orders` refer to the same queue. Valid names are 3-63
/// characters of ASCII alphanumerics and hyphens, start and end with an
/// alphanumeric, and contain no consecutive hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, QueueError> {
        let name = name.into().to_ascii_lowercase();

        if name.len() < QUEUE_NAME_MIN_LEN || name.len() > QUEUE_NAME_MAX_LEN {
            return Err(QueueError::InvalidQueueName {
                queue_name: name,
                message: format!(
                    "must be {}-{} characters",
                    QUEUE_NAME_MIN_LEN, QUEUE_NAME_MAX_LEN
                ),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(QueueError::InvalidQueueName {
                queue_name: name,
                message: "only ASCII letters, digits, and hyphens allowed".to_string(),
            });
        }

        if name.starts_with('-') || name.ends_with('-') || name.contains("--") {
            return Err(QueueError::InvalidQueueName {
                queue_name: name,
                message: "no leading/trailing hyphens or consecutive hyphens".to_string(),
            });
        }

        Ok(Self(name))
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
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier for messages within their queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new random message ID
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4();
        Self(id.to_string())
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(QueueError::InvalidArgument {
                field: "message_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

/// Opaque token proving the caller holds the current lease on a message.
///
/// A fresh receipt is issued on every successful retrieval or update, and
/// the previous one stops matching. Delete and update require the current
/// receipt; a stale receipt is rejected with `ReceiptMismatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopReceipt(String);

impl PopReceipt {
    /// Issue a new opaque receipt
    pub(crate) fn issue() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get receipt as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PopReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PopReceipt {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(QueueError::InvalidArgument {
                field: "pop_receipt".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

/// Timestamp wrapper for consistent time handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current time
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create timestamp from DateTime
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Timestamp shifted forward by a duration
    pub fn plus(&self, duration: Duration) -> Self {
        Self(self.0 + duration)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dt = s.parse::<DateTime<Utc>>()?;
        Ok(Self::from_datetime(dt))
    }
}

/// Custom serialization for Bytes
mod bytes_serde {
    use base64::{engine::general_purpose, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = general_purpose::STANDARD.encode(bytes);
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)?;
        Ok(Bytes::from(decoded))
    }
}

// ============================================================================
// Enqueue Options
// ============================================================================

/// Configuration options for enqueuing a message
#[derive(Debug, Clone, Default)]
pub struct EnqueueOptions {
    /// Time-to-live; the message is discarded once it lapses.
    /// Defaults to the configured service default (7 days).
    pub time_to_live: Option<Duration>,
    /// Initial visibility delay; the message stays hidden until it elapses.
    /// Defaults to zero (immediately visible).
    pub visibility_delay: Option<Duration>,
}

impl EnqueueOptions {
    /// Create new enqueue options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set time-to-live for message expiration
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Set initial visibility delay
    pub fn with_visibility_delay(mut self, delay: Duration) -> Self {
        self.visibility_delay = Some(delay);
        self
    }
}

// ============================================================================
// Operation Results
// ============================================================================

/// Result of enqueuing a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueReceipt {
    pub message_id: MessageId,
    pub inserted_at: Timestamp,
    pub expires_at: Timestamp,
    pub visible_at: Timestamp,
}

/// A message observed by `peek`, without any lease or receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeekedMessage {
    pub message_id: MessageId,
    #[serde(with = "bytes_serde")]
    pub body: Bytes,
    pub inserted_at: Timestamp,
    pub expires_at: Timestamp,
    pub dequeue_count: u32,
}

/// A message handed out by `retrieve`, leased until `next_visible_at`.
///
/// The embedded pop receipt is required to delete or update the message
/// while the lease holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedMessage {
    pub message_id: MessageId,
    #[serde(with = "bytes_serde")]
    pub body: Bytes,
    pub inserted_at: Timestamp,
    pub expires_at: Timestamp,
    pub dequeue_count: u32,
    pub pop_receipt: PopReceipt,
    pub next_visible_at: Timestamp,
}

/// Result of updating a retrieved message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedMessage {
    pub pop_receipt: PopReceipt,
    pub next_visible_at: Timestamp,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
