//! Service limits and reconciliation configuration.
//!
//! The queue service models its numeric bounds as configuration rather than
//! hard-coded requirements. Defaults follow common hosted-queue conventions
//! (64 KiB bodies, 7-day maximum time-to-live, 32-message batches). Limits
//! can be loaded from an optional config file and `QV`-prefixed environment
//! variables; every field carries a serde default, so an unconfigured
//! environment yields a valid set of limits.

use crate::error::QueueError;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// How expired leases are reconciled back to visible messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ReconcileMode {
    /// Reconcile lazily at the start of every store operation
    OnAccess,
    /// Reconcile on access and additionally sweep all queues on an interval
    Background { interval_secs: u64 },
}

impl Default for ReconcileMode {
    fn default() -> Self {
        Self::OnAccess
    }
}

/// Numeric bounds and behavioral knobs for the queue service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLimits {
    /// Maximum message body size in bytes
    pub max_body_bytes: usize,

    /// Default message time-to-live in seconds when none is supplied
    pub default_time_to_live_secs: i64,

    /// Maximum message time-to-live in seconds
    pub max_time_to_live_secs: i64,

    /// Minimum visibility timeout for `retrieve`, in seconds
    pub min_visibility_timeout_secs: i64,

    /// Maximum visibility timeout (and enqueue delay), in seconds
    pub max_visibility_timeout_secs: i64,

    /// Maximum messages per `peek`/`retrieve` call
    pub max_batch_size: u32,

    /// Minimum retention-policy days when retention is enabled
    pub min_retention_days: u32,

    /// Maximum retention-policy days when retention is enabled
    pub max_retention_days: u32,

    /// Lease reconciliation strategy
    pub reconcile: ReconcileMode,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        const SEVEN_DAYS_SECS: i64 = 7 * 24 * 60 * 60;
        Self {
            max_body_bytes: 64 * 1024,
            default_time_to_live_secs: SEVEN_DAYS_SECS,
            max_time_to_live_secs: SEVEN_DAYS_SECS,
            min_visibility_timeout_secs: 1,
            max_visibility_timeout_secs: SEVEN_DAYS_SECS,
            max_batch_size: 32,
            min_retention_days: 1,
            max_retention_days: 365,
            reconcile: ReconcileMode::default(),
        }
    }
}

impl ServiceLimits {
    /// Load limits from configuration sources.
    ///
    /// Sources (later sources override earlier ones):
    ///  1. `config/queue-vault.{toml,yaml}` next to the process, if present
    ///  2. Environment variables prefixed `QV` with `__` as the separator,
    ///     e.g. `QV__MAX_BATCH_SIZE=16`
    ///
    /// Absent files or an unconfigured environment produce built-in
    /// defaults; a malformed file or an uncoercible variable is an error.
    pub fn load() -> Result<Self, QueueError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/queue-vault").required(false))
            .add_source(config::Environment::with_prefix("QV").separator("__"))
            .build()
            .map_err(|e| QueueError::Configuration {
                message: format!("failed to read limits configuration: {e}"),
            })?;

        let limits: Self =
            settings
                .try_deserialize()
                .map_err(|e| QueueError::Configuration {
                    message: format!("invalid limits configuration: {e}"),
                })?;

        limits.validate()?;
        Ok(limits)
    }

    /// Check internal consistency of the configured bounds
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.max_body_bytes == 0 {
            return Err(QueueError::Configuration {
                message: "max_body_bytes must be positive".to_string(),
            });
        }
        if self.default_time_to_live_secs <= 0
            || self.default_time_to_live_secs > self.max_time_to_live_secs
        {
            return Err(QueueError::Configuration {
                message: "default_time_to_live_secs must be in 1..=max_time_to_live_secs"
                    .to_string(),
            });
        }
        if self.min_visibility_timeout_secs < 1
            || self.min_visibility_timeout_secs > self.max_visibility_timeout_secs
        {
            return Err(QueueError::Configuration {
                message: "visibility timeout range is empty".to_string(),
            });
        }
        if self.max_batch_size == 0 {
            return Err(QueueError::Configuration {
                message: "max_batch_size must be positive".to_string(),
            });
        }
        if self.min_retention_days < 1 || self.min_retention_days > self.max_retention_days {
            return Err(QueueError::Configuration {
                message: "retention day range is empty".to_string(),
            });
        }
        if let ReconcileMode::Background { interval_secs } = self.reconcile {
            if interval_secs == 0 {
                return Err(QueueError::Configuration {
                    message: "background reconcile interval must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Default time-to-live as a duration
    pub fn default_time_to_live(&self) -> Duration {
        Duration::seconds(self.default_time_to_live_secs)
    }

    /// Validate a caller-supplied time-to-live
    pub(crate) fn check_time_to_live(&self, ttl: Duration) -> Result<(), QueueError> {
        let secs = ttl.num_seconds();
        if secs <= 0 || secs > self.max_time_to_live_secs {
            return Err(QueueError::InvalidArgument {
                field: "time_to_live".to_string(),
                message: format!("must be 1..={} seconds", self.max_time_to_live_secs),
            });
        }
        Ok(())
    }

    /// Validate a visibility timeout for `retrieve`
    pub(crate) fn check_retrieve_visibility(&self, timeout: Duration) -> Result<(), QueueError> {
        let secs = timeout.num_seconds();
        if secs < self.min_visibility_timeout_secs || secs > self.max_visibility_timeout_secs {
            return Err(QueueError::InvalidArgument {
                field: "visibility_timeout".to_string(),
                message: format!(
                    "must be {}..={} seconds",
                    self.min_visibility_timeout_secs, self.max_visibility_timeout_secs
                ),
            });
        }
        Ok(())
    }

    /// Validate a visibility timeout for `update` or an enqueue delay.
    ///
    /// Unlike `retrieve`, zero is allowed so a caller can make a leased
    /// message visible immediately.
    pub(crate) fn check_update_visibility(&self, timeout: Duration) -> Result<(), QueueError> {
        let secs = timeout.num_seconds();
        if secs < 0 || secs > self.max_visibility_timeout_secs {
            return Err(QueueError::InvalidArgument {
                field: "visibility_timeout".to_string(),
                message: format!("must be 0..={} seconds", self.max_visibility_timeout_secs),
            });
        }
        Ok(())
    }

    /// Validate a `peek`/`retrieve` batch size
    pub(crate) fn check_batch_size(&self, max_count: u32) -> Result<(), QueueError> {
        if max_count == 0 || max_count > self.max_batch_size {
            return Err(QueueError::InvalidArgument {
                field: "max_count".to_string(),
                message: format!("must be 1..={}", self.max_batch_size),
            });
        }
        Ok(())
    }

    /// Validate a message body size
    pub(crate) fn check_body_size(&self, size: usize) -> Result<(), QueueError> {
        if size > self.max_body_bytes {
            return Err(QueueError::PayloadTooLarge {
                size,
                max_size: self.max_body_bytes,
            });
        }
        Ok(())
    }

    /// Validate retention-policy days
    pub(crate) fn check_retention_days(&self, days: u32) -> Result<(), QueueError> {
        if days < self.min_retention_days || days > self.max_retention_days {
            return Err(QueueError::InvalidArgument {
                field: "retention_days".to_string(),
                message: format!(
                    "must be {}..={}",
                    self.min_retention_days, self.max_retention_days
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod tests;
