//! Service facade: the transport-agnostic request/response surface.
//!
//! [`QueueService`] is the single entry point external callers (transport
//! layers, SDKs, drivers) go through. It validates queue names at the
//! boundary, then dispatches queue-level operations to the
//! [`QueueRegistry`] and service-level operations to the
//! [`ServicePropertiesStore`]. The core performs no implicit retries;
//! every operation returns a typed result.

use crate::error::QueueError;
use crate::lease::spawn_lease_sweeper;
use crate::limits::{ReconcileMode, ServiceLimits};
use crate::message::{
    EnqueueOptions, EnqueueReceipt, MessageId, PeekedMessage, PopReceipt, QueueName,
    RetrievedMessage, UpdatedMessage,
};
use crate::metadata::MetadataMap;
use crate::properties::{ServiceProperties, ServicePropertiesStore};
use crate::registry::{QueueDescriptor, QueueMetadataResult, QueueRegistry};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// The queue service request/response API.
///
/// One method per service operation; a transport layer maps wire requests
/// onto these calls one-to-one.
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Create a queue, optionally with initial metadata
    async fn create_queue(
        &self,
        name: &str,
        metadata: Option<MetadataMap>,
    ) -> Result<(), QueueError>;

    /// Delete a queue and all messages it contains
    async fn delete_queue(&self, name: &str) -> Result<(), QueueError>;

    /// List queues sorted by name, optionally filtered by prefix
    async fn list_queues(&self, prefix: Option<&str>) -> Result<Vec<QueueDescriptor>, QueueError>;

    /// Get a queue's metadata and approximate message count
    async fn get_queue_metadata(&self, name: &str) -> Result<QueueMetadataResult, QueueError>;

    /// Replace a queue's metadata in full
    async fn set_queue_metadata(
        &self,
        name: &str,
        metadata: MetadataMap,
    ) -> Result<(), QueueError>;

    /// Add a message to a queue
    async fn enqueue_message(
        &self,
        queue: &str,
        body: Bytes,
        options: EnqueueOptions,
    ) -> Result<EnqueueReceipt, QueueError>;

    /// Read up to `max_count` visible messages without leasing them
    async fn peek_messages(
        &self,
        queue: &str,
        max_count: u32,
    ) -> Result<Vec<PeekedMessage>, QueueError>;

    /// Lease up to `max_count` visible messages for `visibility_timeout`
    async fn retrieve_messages(
        &self,
        queue: &str,
        max_count: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<RetrievedMessage>, QueueError>;

    /// Delete a message, authorized by its current pop receipt
    async fn delete_message(
        &self,
        queue: &str,
        id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), QueueError>;

    /// Update a leased message's visibility window and optionally its body
    async fn update_message(
        &self,
        queue: &str,
        id: &MessageId,
        pop_receipt: &PopReceipt,
        new_body: Option<Bytes>,
        visibility_timeout: Duration,
    ) -> Result<UpdatedMessage, QueueError>;

    /// Remove all messages from a queue, leased or not
    async fn clear_messages(&self, queue: &str) -> Result<(), QueueError>;

    /// Snapshot of the service-wide properties
    async fn get_service_properties(&self) -> Result<ServiceProperties, QueueError>;

    /// Validate and replace the service-wide properties
    async fn set_service_properties(
        &self,
        properties: ServiceProperties,
    ) -> Result<(), QueueError>;
}

/// Standard queue service implementation
///
/// # Examples
///
/// ```rust
/// use bytes::Bytes;
/// use chrono::Duration;
/// use queue_vault::{EnqueueOptions, QueueApi, QueueService};
///
/// # tokio_test::block_on(async {
/// let service = QueueService::new();
/// service.create_queue("orders", None).await.unwrap();
///
/// service
///     .enqueue_message("orders", Bytes::from_static(b"order-1"), EnqueueOptions::new())
///     .await
///     .unwrap();
///
/// let retrieved = service
///     .retrieve_messages("orders", 1, Duration::seconds(30))
///     .await
///     .unwrap();
/// assert_eq!(retrieved[0].body.as_ref(), b"order-1");
///
/// service
///     .delete_message("orders", &retrieved[0].message_id, &retrieved[0].pop_receipt)
///     .await
///     .unwrap();
/// # });
/// ```
pub struct QueueService {
    registry: Arc<QueueRegistry>,
    properties: ServicePropertiesStore,
    sweeper: Option<tokio::task::JoinHandle<()>>,
}

impl QueueService {
    /// Create a service with default limits
    pub fn new() -> Self {
        Self::with_limits(ServiceLimits::default())
    }

    /// Create a service with the given limits.
    ///
    /// With [`ReconcileMode::Background`] a sweeper task is spawned that
    /// reconciles every queue on the configured interval; it is stopped
    /// when the service is dropped. Must be called within a tokio runtime
    /// in that mode.
    pub fn with_limits(limits: ServiceLimits) -> Self {
        let registry = Arc::new(QueueRegistry::new(limits.clone()));
        let properties = ServicePropertiesStore::new(limits.clone());

        let sweeper = match limits.reconcile {
            ReconcileMode::OnAccess => None,
            ReconcileMode::Background { interval_secs } => {
                info!(interval_secs, "starting background lease sweeper");
                Some(spawn_lease_sweeper(
                    Arc::clone(&registry),
                    std::time::Duration::from_secs(interval_secs),
                ))
            }
        };

        Self {
            registry,
            properties,
            sweeper,
        }
    }

    /// Load limits from configuration and create the service
    pub fn from_config() -> Result<Self, QueueError> {
        let limits = ServiceLimits::load()?;
        Ok(Self::with_limits(limits))
    }

    /// Check whether a queue exists
    pub async fn queue_exists(&self, name: &str) -> Result<bool, QueueError> {
        let name = QueueName::new(name)?;
        Ok(self.registry.queue_exists(&name).await)
    }

    /// Restore the service properties displaced by the most recent set.
    ///
    /// Returns `false` when nothing has been set yet.
    pub async fn revert_service_properties(&self) -> bool {
        self.properties.revert().await
    }
}

impl Default for QueueService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QueueService {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

#[async_trait]
impl QueueApi for QueueService {
    async fn create_queue(
        &self,
        name: &str,
        metadata: Option<MetadataMap>,
    ) -> Result<(), QueueError> {
        let name = QueueName::new(name)?;
        self.registry.create_queue(name, metadata).await
    }

    async fn delete_queue(&self, name: &str) -> Result<(), QueueError> {
        let name = QueueName::new(name)?;
        self.registry.delete_queue(&name).await
    }

    async fn list_queues(&self, prefix: Option<&str>) -> Result<Vec<QueueDescriptor>, QueueError> {
        Ok(self.registry.list_queues(prefix).await)
    }

    async fn get_queue_metadata(&self, name: &str) -> Result<QueueMetadataResult, QueueError> {
        let name = QueueName::new(name)?;
        self.registry.get_metadata(&name).await
    }

    async fn set_queue_metadata(
        &self,
        name: &str,
        metadata: MetadataMap,
    ) -> Result<(), QueueError> {
        let name = QueueName::new(name)?;
        self.registry.set_metadata(&name, metadata).await
    }

    async fn enqueue_message(
        &self,
        queue: &str,
        body: Bytes,
        options: EnqueueOptions,
    ) -> Result<EnqueueReceipt, QueueError> {
        let name = QueueName::new(queue)?;
        let receipt = self.registry.enqueue(&name, body, &options).await?;
        debug!(queue = %name, message_id = %receipt.message_id, "enqueued message");
        Ok(receipt)
    }

    async fn peek_messages(
        &self,
        queue: &str,
        max_count: u32,
    ) -> Result<Vec<PeekedMessage>, QueueError> {
        let name = QueueName::new(queue)?;
        self.registry.peek(&name, max_count).await
    }

    async fn retrieve_messages(
        &self,
        queue: &str,
        max_count: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<RetrievedMessage>, QueueError> {
        let name = QueueName::new(queue)?;
        let retrieved = self
            .registry
            .retrieve(&name, max_count, visibility_timeout)
            .await?;
        debug!(
            queue = %name,
            count = retrieved.len(),
            "retrieved messages under lease"
        );
        Ok(retrieved)
    }

    async fn delete_message(
        &self,
        queue: &str,
        id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), QueueError> {
        let name = QueueName::new(queue)?;
        self.registry.delete_message(&name, id, pop_receipt).await
    }

    async fn update_message(
        &self,
        queue: &str,
        id: &MessageId,
        pop_receipt: &PopReceipt,
        new_body: Option<Bytes>,
        visibility_timeout: Duration,
    ) -> Result<UpdatedMessage, QueueError> {
        let name = QueueName::new(queue)?;
        self.registry
            .update_message(&name, id, pop_receipt, new_body, visibility_timeout)
            .await
    }

    async fn clear_messages(&self, queue: &str) -> Result<(), QueueError> {
        let name = QueueName::new(queue)?;
        self.registry.clear_messages(&name).await?;
        debug!(queue = %name, "cleared all messages");
        Ok(())
    }

    async fn get_service_properties(&self) -> Result<ServiceProperties, QueueError> {
        Ok(self.properties.get().await)
    }

    async fn set_service_properties(
        &self,
        properties: ServiceProperties,
    ) -> Result<(), QueueError> {
        self.properties.set(properties).await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
