//! Service-wide properties: logging and metrics retention configuration.
//!
//! These settings apply to the service as a whole, independent of any
//! queue. They are held in a single shared [`ServicePropertiesStore`]
//! with snapshot reads, validated full-replace writes, and a revert to
//! the previously set value.

use crate::error::QueueError;
use crate::limits::ServiceLimits;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Rule governing how long logging or metrics data is retained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub enabled: bool,
    /// Required when `enabled`; bounded by the configured retention range
    pub days: Option<u32>,
}

impl RetentionPolicy {
    /// Retention disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            days: None,
        }
    }

    /// Retain data for the given number of days
    pub fn for_days(days: u32) -> Self {
        Self {
            enabled: true,
            days: Some(days),
        }
    }

    fn validate(&self, limits: &ServiceLimits) -> Result<(), QueueError> {
        if !self.enabled {
            return Ok(());
        }
        match self.days {
            Some(days) => limits.check_retention_days(days),
            None => Err(QueueError::InvalidArgument {
                field: "retention_days".to_string(),
                message: "required when retention is enabled".to_string(),
            }),
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Logging configuration: which operation categories are logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingProperties {
    pub version: String,
    pub read: bool,
    pub write: bool,
    pub delete: bool,
    pub retention_policy: RetentionPolicy,
}

impl Default for LoggingProperties {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            read: false,
            write: false,
            delete: false,
            retention_policy: RetentionPolicy::disabled(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsProperties {
    pub version: String,
    pub enabled: bool,
    pub include_apis: bool,
    pub retention_policy: RetentionPolicy,
}

impl Default for MetricsProperties {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            enabled: false,
            include_apis: false,
            retention_policy: RetentionPolicy::disabled(),
        }
    }
}

/// The complete service-level property set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProperties {
    pub logging: LoggingProperties,
    pub metrics: MetricsProperties,
}

impl ServiceProperties {
    /// Validate against the configured retention bounds
    pub fn validate(&self, limits: &ServiceLimits) -> Result<(), QueueError> {
        if self.logging.version.is_empty() {
            return Err(QueueError::InvalidArgument {
                field: "logging.version".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.metrics.version.is_empty() {
            return Err(QueueError::InvalidArgument {
                field: "metrics.version".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self.logging.retention_policy.validate(limits)?;
        self.metrics.retention_policy.validate(limits)?;
        Ok(())
    }
}

/// Process-shared holder of the current [`ServiceProperties`].
///
/// Readers get a snapshot and never observe a partially written update;
/// `set` replaces the whole value after validation and keeps the displaced
/// value so a caller can `revert` to it (the get/set/revert cycle a client
/// runs when it temporarily reconfigures the service).
pub struct ServicePropertiesStore {
    state: RwLock<PropertiesState>,
    limits: ServiceLimits,
}

struct PropertiesState {
    current: ServiceProperties,
    previous: Option<ServiceProperties>,
}

impl ServicePropertiesStore {
    pub fn new(limits: ServiceLimits) -> Self {
        Self {
            state: RwLock::new(PropertiesState {
                current: ServiceProperties::default(),
                previous: None,
            }),
            limits,
        }
    }

    /// Snapshot of the current properties
    pub async fn get(&self) -> ServiceProperties {
        self.state.read().await.current.clone()
    }

    /// Validate and replace the current properties in full
    pub async fn set(&self, properties: ServiceProperties) -> Result<(), QueueError> {
        properties.validate(&self.limits)?;

        let mut state = self.state.write().await;
        let displaced = std::mem::replace(&mut state.current, properties);
        state.previous = Some(displaced);
        debug!("service properties replaced");
        Ok(())
    }

    /// Restore the properties displaced by the most recent `set`.
    ///
    /// Returns `false` when there is nothing to revert to.
    pub async fn revert(&self) -> bool {
        let mut state = self.state.write().await;
        match state.previous.take() {
            Some(previous) => {
                state.previous = Some(std::mem::replace(&mut state.current, previous));
                debug!("service properties reverted");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "properties_tests.rs"]
mod tests;
