//! # Queue Vault
//!
//! Durable in-process message queue service core: named queues with
//! metadata, leased message retrieval with pop receipts, and service-wide
//! logging/metrics retention properties.
//!
//! This library provides:
//! - Queue lifecycle: create, delete, list, metadata
//! - Message lifecycle: enqueue, peek, retrieve, update, delete, clear
//! - At-least-once delivery via visibility timeouts and lease expiry
//! - Pop receipts guarding delete/update against stale consumers
//! - Service-wide properties with get/set/revert semantics
//!
//! ## Module Organization
//!
//! - [error] - Error types for all service operations
//! - [message] - Message structures, identifiers, and pop receipts
//! - [metadata] - Case-insensitive queue metadata maps
//! - [limits] - Configurable service bounds and reconciliation mode
//! - [registry] - Queue registry and per-queue dispatch
//! - [properties] - Service-wide logging/metrics properties
//! - [service] - The `QueueApi` facade
//!
//! Message storage and lease scheduling are internal; everything reaches
//! them through the registry or the facade.
//!
//! ## Delivery Semantics
//!
//! A retrieved message stays invisible until its visibility timeout
//! elapses or it is deleted with the receipt from that retrieval. A
//! consumer that crashes mid-processing loses nothing: the lease expires
//! and the message is handed out again with its dequeue count
//! incremented. Consumers must therefore be idempotent.

// Module declarations
pub mod error;
mod lease;
pub mod limits;
pub mod message;
pub mod metadata;
pub mod properties;
pub mod registry;
pub mod service;
mod store;

// Re-export commonly used types at crate root for convenience
pub use error::QueueError;
pub use limits::{ReconcileMode, ServiceLimits};
pub use message::{
    EnqueueOptions, EnqueueReceipt, MessageId, PeekedMessage, PopReceipt, QueueName,
    RetrievedMessage, Timestamp, UpdatedMessage,
};
pub use metadata::MetadataMap;
pub use properties::{
    LoggingProperties, MetricsProperties, RetentionPolicy, ServiceProperties,
    ServicePropertiesStore,
};
pub use registry::{QueueDescriptor, QueueMetadataResult, QueueRegistry};
pub use service::{QueueApi, QueueService};
