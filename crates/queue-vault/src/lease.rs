//! Lease scheduling: time-ordered indexes and the background sweeper.
//!
//! Every retrieval grants a lease (an invisibility window). The store keeps
//! a min-heap of lease expiries so reconciliation touches only messages
//! whose lease is actually due instead of scanning the whole queue. The
//! same index type tracks time-to-live expiry for lazy purging.
//!
//! Reconciliation runs at the start of every store operation; with
//! [`ReconcileMode::Background`](crate::limits::ReconcileMode) a tokio task
//! additionally sweeps all queues on an interval so expired leases and
//! lapsed messages are reclaimed even on idle queues.

use crate::message::Timestamp;
use crate::registry::QueueRegistry;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::debug;

/// Min-heap of (due time, sequence) entries.
///
/// Entries are scheduled when a lease is granted or a message is given a
/// future timestamp, and popped once due. An entry may be stale by the
/// time it pops (message deleted, re-leased, or updated); callers must
/// re-validate against current message state.
#[derive(Debug, Default)]
pub(crate) struct LeaseIndex {
    heap: BinaryHeap<Reverse<(Timestamp, u64)>>,
}

impl LeaseIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedule a sequence number to come due at `when`
    pub(crate) fn schedule(&mut self, when: Timestamp, seq: u64) {
        self.heap.push(Reverse((when, seq)));
    }

    /// Pop the next sequence whose due time has passed, if any
    pub(crate) fn pop_due(&mut self, now: Timestamp) -> Option<u64> {
        let due = self.heap.peek().map(|Reverse((due, _))| *due)?;
        if due <= now {
            self.heap.pop().map(|Reverse((_, seq))| seq)
        } else {
            None
        }
    }

    /// Due time of the earliest scheduled entry
    pub(crate) fn next_due(&self) -> Option<Timestamp> {
        self.heap.peek().map(|Reverse((due, _))| *due)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Spawn the background lease sweeper.
///
/// Calls [`QueueRegistry::reconcile_all`] every `interval`. The returned
/// handle can be aborted to stop sweeping; dropping it leaves the task
/// running.
pub(crate) fn spawn_lease_sweeper(
    registry: Arc<QueueRegistry>,
    interval: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so sweeps start one
        // interval after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let reclaimed = registry.reconcile_all().await;
            if reclaimed > 0 {
                debug!(reclaimed, "lease sweep reclaimed expired leases");
            }
        }
    })
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
