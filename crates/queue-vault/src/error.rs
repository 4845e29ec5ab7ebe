//! Error types for queue service operations.

use chrono::Duration;
use thiserror::Error;

/// Comprehensive error type for all queue service operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue not found: {queue_name}")]
    QueueNotFound { queue_name: String },

    #[error("Queue already exists: {queue_name}")]
    QueueAlreadyExists { queue_name: String },

    #[error("Invalid queue name '{queue_name}': {message}")]
    InvalidQueueName {
        queue_name: String,
        message: String,
    },

    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: String },

    #[error("Pop receipt does not match current receipt for message {message_id}")]
    ReceiptMismatch { message_id: String },

    #[error("Message body too large: {size} bytes (max: {max_size})")]
    PayloadTooLarge { size: usize, max_size: usize },

    #[error("Invalid argument for {field}: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },
}

impl QueueError {
    /// Check if error is transient and safe for the caller to retry
    pub fn is_transient(&self) -> bool {
        match self {
            Self::QueueNotFound { .. } => false,
            Self::QueueAlreadyExists { .. } => false,
            Self::InvalidQueueName { .. } => false,
            Self::MessageNotFound { .. } => false,
            Self::ReceiptMismatch { .. } => false,
            Self::PayloadTooLarge { .. } => false,
            Self::InvalidArgument { .. } => false,
            Self::Configuration { .. } => false,
            Self::ServiceUnavailable { .. } => true,
        }
    }

    /// Check if error should be retried
    ///
    /// The core never retries implicitly; this is a hint for transport or
    /// client layers that own the retry policy.
    pub fn should_retry(&self) -> bool {
        self.is_transient()
    }

    /// Get suggested retry delay
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ServiceUnavailable { .. } => Some(Duration::seconds(5)),
            _ => None,
        }
    }

    /// Check if error is an expected per-message condition.
    ///
    /// `MessageNotFound` and `ReceiptMismatch` are part of normal operation
    /// under concurrent consumers and must be handled per message rather
    /// than treated as fatal.
    pub fn is_expected_contention(&self) -> bool {
        matches!(
            self,
            Self::MessageNotFound { .. } | Self::ReceiptMismatch { .. }
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
