//! Queue registry: queue lifecycle, metadata, and per-queue dispatch.
//!
//! The registry owns every queue and its message store. Queue lookup takes
//! a read lock on the queue table; message operations then serialize on the
//! target queue's own mutex, so operations on different queues never block
//! each other.

use crate::error::QueueError;
use crate::limits::ServiceLimits;
use crate::message::{
    EnqueueOptions, EnqueueReceipt, MessageId, PeekedMessage, PopReceipt, QueueName,
    RetrievedMessage, Timestamp, UpdatedMessage,
};
use crate::metadata::MetadataMap;
use crate::store::MessageStore;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Point-in-time description of a queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueDescriptor {
    pub name: QueueName,
    pub created_at: Timestamp,
    pub approximate_message_count: u64,
}

/// Queue metadata together with the approximate message count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMetadataResult {
    pub metadata: MetadataMap,
    pub approximate_message_count: u64,
}

/// A queue and its owned state
struct QueueEntry {
    name: QueueName,
    created_at: Timestamp,
    metadata: RwLock<MetadataMap>,
    store: Mutex<MessageStore>,
    /// Eventually consistent live-message counter, refreshed after every
    /// store operation. Readable without taking the store mutex.
    approx_count: AtomicU64,
}

impl QueueEntry {
    fn new(name: QueueName, created_at: Timestamp, limits: ServiceLimits) -> Self {
        Self {
            name,
            created_at,
            metadata: RwLock::new(MetadataMap::new()),
            store: Mutex::new(MessageStore::new(limits)),
            approx_count: AtomicU64::new(0),
        }
    }

    /// Run an operation against the store and refresh the counter
    async fn with_store<T>(&self, op: impl FnOnce(&mut MessageStore) -> T) -> T {
        let mut store = self.store.lock().await;
        let result = op(&mut store);
        self.approx_count
            .store(store.live_len() as u64, Ordering::Relaxed);
        result
    }
}

/// Registry of all queues in the service
pub struct QueueRegistry {
    queues: RwLock<HashMap<QueueName, Arc<QueueEntry>>>,
    limits: ServiceLimits,
}

impl QueueRegistry {
    pub fn new(limits: ServiceLimits) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            limits,
        }
    }

    /// Create a queue, optionally with initial metadata.
    ///
    /// # Errors
    ///
    /// Returns `QueueAlreadyExists` if a queue of that name (compared
    /// case-insensitively) already exists.
    pub async fn create_queue(
        &self,
        name: QueueName,
        metadata: Option<MetadataMap>,
    ) -> Result<(), QueueError> {
        let mut queues = self.queues.write().await;
        if queues.contains_key(&name) {
            return Err(QueueError::QueueAlreadyExists {
                queue_name: name.to_string(),
            });
        }

        let entry = Arc::new(QueueEntry::new(
            name.clone(),
            Timestamp::now(),
            self.limits.clone(),
        ));
        if let Some(metadata) = metadata {
            *entry.metadata.write().await = metadata;
        }
        queues.insert(name.clone(), entry);
        debug!(queue = %name, "created queue");
        Ok(())
    }

    /// Delete a queue and discard all of its messages.
    ///
    /// Deletion is not idempotent: deleting an absent queue is
    /// `QueueNotFound` and callers must handle it.
    pub async fn delete_queue(&self, name: &QueueName) -> Result<(), QueueError> {
        let mut queues = self.queues.write().await;
        match queues.remove(name) {
            Some(_) => {
                debug!(queue = %name, "deleted queue");
                Ok(())
            }
            None => Err(QueueError::QueueNotFound {
                queue_name: name.to_string(),
            }),
        }
    }

    /// Check whether a queue exists
    pub async fn queue_exists(&self, name: &QueueName) -> bool {
        self.queues.read().await.contains_key(name)
    }

    /// List queues, optionally filtered by name prefix.
    ///
    /// Returns a point-in-time snapshot sorted by name; queues created or
    /// deleted afterwards are not reflected.
    pub async fn list_queues(&self, prefix: Option<&str>) -> Vec<QueueDescriptor> {
        let queues = self.queues.read().await;
        let prefix = prefix.map(str::to_ascii_lowercase);

        let mut descriptors: Vec<QueueDescriptor> = queues
            .values()
            .filter(|entry| match &prefix {
                Some(prefix) => entry.name.as_str().starts_with(prefix),
                None => true,
            })
            .map(|entry| QueueDescriptor {
                name: entry.name.clone(),
                created_at: entry.created_at,
                approximate_message_count: entry.approx_count.load(Ordering::Relaxed),
            })
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Get a queue's metadata and approximate message count
    pub async fn get_metadata(&self, name: &QueueName) -> Result<QueueMetadataResult, QueueError> {
        let entry = self.entry(name).await?;
        let metadata = entry.metadata.read().await.clone();
        Ok(QueueMetadataResult {
            metadata,
            approximate_message_count: entry.approx_count.load(Ordering::Relaxed),
        })
    }

    /// Replace a queue's metadata in full (not a merge)
    pub async fn set_metadata(
        &self,
        name: &QueueName,
        metadata: MetadataMap,
    ) -> Result<(), QueueError> {
        let entry = self.entry(name).await?;
        *entry.metadata.write().await = metadata;
        Ok(())
    }

    /// Approximate number of live messages in a queue.
    ///
    /// Maintained as a running counter; eventually consistent with the
    /// store and readable without blocking message operations.
    pub async fn approximate_message_count(&self, name: &QueueName) -> Result<u64, QueueError> {
        let entry = self.entry(name).await?;
        Ok(entry.approx_count.load(Ordering::Relaxed))
    }

    // ------------------------------------------------------------------
    // Message operations, serialized per queue
    // ------------------------------------------------------------------

    pub async fn enqueue(
        &self,
        name: &QueueName,
        body: Bytes,
        options: &EnqueueOptions,
    ) -> Result<EnqueueReceipt, QueueError> {
        let entry = self.entry(name).await?;
        entry
            .with_store(|store| store.enqueue_at(Timestamp::now(), body, options))
            .await
    }

    pub async fn peek(
        &self,
        name: &QueueName,
        max_count: u32,
    ) -> Result<Vec<PeekedMessage>, QueueError> {
        let entry = self.entry(name).await?;
        entry
            .with_store(|store| store.peek_at(Timestamp::now(), max_count))
            .await
    }

    pub async fn retrieve(
        &self,
        name: &QueueName,
        max_count: u32,
        visibility_timeout: chrono::Duration,
    ) -> Result<Vec<RetrievedMessage>, QueueError> {
        let entry = self.entry(name).await?;
        entry
            .with_store(|store| store.retrieve_at(Timestamp::now(), max_count, visibility_timeout))
            .await
    }

    pub async fn delete_message(
        &self,
        name: &QueueName,
        id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), QueueError> {
        let entry = self.entry(name).await?;
        entry
            .with_store(|store| store.delete_message_at(Timestamp::now(), id, pop_receipt))
            .await
    }

    pub async fn update_message(
        &self,
        name: &QueueName,
        id: &MessageId,
        pop_receipt: &PopReceipt,
        new_body: Option<Bytes>,
        visibility_timeout: chrono::Duration,
    ) -> Result<UpdatedMessage, QueueError> {
        let entry = self.entry(name).await?;
        entry
            .with_store(|store| {
                store.update_message_at(
                    Timestamp::now(),
                    id,
                    pop_receipt,
                    new_body,
                    visibility_timeout,
                )
            })
            .await
    }

    pub async fn clear_messages(&self, name: &QueueName) -> Result<(), QueueError> {
        let entry = self.entry(name).await?;
        entry.with_store(|store| store.clear()).await;
        Ok(())
    }

    /// Reconcile every queue's lease and expiry state.
    ///
    /// Used by the background sweeper; returns the total number of leases
    /// reclaimed across all queues.
    pub async fn reconcile_all(&self) -> usize {
        let entries: Vec<Arc<QueueEntry>> = {
            let queues = self.queues.read().await;
            queues.values().cloned().collect()
        };

        let mut reclaimed = 0;
        for entry in entries {
            reclaimed += entry
                .with_store(|store| store.reconcile_at(Timestamp::now()))
                .await;
        }
        reclaimed
    }

    async fn entry(&self, name: &QueueName) -> Result<Arc<QueueEntry>, QueueError> {
        let queues = self.queues.read().await;
        queues
            .get(name)
            .cloned()
            .ok_or_else(|| QueueError::QueueNotFound {
                queue_name: name.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
