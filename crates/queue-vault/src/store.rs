//! Per-queue message storage with visibility and lease state.
//!
//! A message is visible when its `visible_after` timestamp has passed and
//! its time-to-live has not lapsed. Retrieval leases a message by pushing
//! `visible_after` into the future; the lease index brings it back once the
//! lease expires, which is what makes delivery at-least-once. FIFO order is
//! approximated by a per-queue insertion sequence.
//!
//! All mutating entry points take an explicit `now` so lease and expiry
//! behavior is testable without real sleeps; callers pass
//! [`Timestamp::now`] in production.

use crate::error::QueueError;
use crate::lease::LeaseIndex;
use crate::limits::ServiceLimits;
use crate::message::{
    EnqueueOptions, EnqueueReceipt, MessageId, PeekedMessage, PopReceipt, RetrievedMessage,
    Timestamp, UpdatedMessage,
};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A stored message and its full lifecycle state
#[derive(Debug, Clone)]
struct StoredMessage {
    id: MessageId,
    body: Bytes,
    inserted_at: Timestamp,
    expires_at: Timestamp,
    visible_after: Timestamp,
    dequeue_count: u32,
    /// Current receipt; replaced on every retrieval or update. `None`
    /// until the message has been retrieved at least once.
    pop_receipt: Option<PopReceipt>,
}

impl StoredMessage {
    fn is_visible(&self, now: Timestamp) -> bool {
        self.visible_after <= now && self.expires_at > now
    }
}

/// Ordered per-queue collection of messages.
///
/// Not internally synchronized; the registry wraps each store in a
/// `tokio::sync::Mutex`, which serializes operations per queue while
/// leaving other queues unaffected.
#[derive(Debug)]
pub(crate) struct MessageStore {
    limits: ServiceLimits,
    messages: BTreeMap<u64, StoredMessage>,
    by_id: HashMap<MessageId, u64>,
    /// Sequences of currently visible messages, in insertion order
    visible: BTreeSet<u64>,
    /// Lease expiries and initial visibility delays
    leases: LeaseIndex,
    /// Time-to-live expiries, for lazy purging
    expiries: LeaseIndex,
    next_seq: u64,
}

impl MessageStore {
    pub(crate) fn new(limits: ServiceLimits) -> Self {
        Self {
            limits,
            messages: BTreeMap::new(),
            by_id: HashMap::new(),
            visible: BTreeSet::new(),
            leases: LeaseIndex::new(),
            expiries: LeaseIndex::new(),
            next_seq: 0,
        }
    }

    /// Reconcile lease and time-to-live state against `now`.
    ///
    /// Purges messages whose time-to-live has lapsed, then returns any
    /// message with an expired lease to the visible set, leaving its body
    /// and dequeue count untouched. Returns the number of leases
    /// reclaimed. Runs at the start of every operation, so no message is
    /// ever reported visible with a future lease expiry or invisible past
    /// one.
    pub(crate) fn reconcile_at(&mut self, now: Timestamp) -> usize {
        while let Some(seq) = self.expiries.pop_due(now) {
            let lapsed = self
                .messages
                .get(&seq)
                .is_some_and(|message| message.expires_at <= now);
            if lapsed {
                self.remove(seq);
            }
        }

        let mut reclaimed = 0;
        while let Some(seq) = self.leases.pop_due(now) {
            if let Some(message) = self.messages.get(&seq) {
                // A stale entry (message re-leased with a later expiry)
                // still has a future visible_after; the newer entry will
                // handle it.
                if message.is_visible(now) && self.visible.insert(seq) {
                    reclaimed += 1;
                }
            }
        }
        reclaimed
    }

    pub(crate) fn enqueue_at(
        &mut self,
        now: Timestamp,
        body: Bytes,
        options: &EnqueueOptions,
    ) -> Result<EnqueueReceipt, QueueError> {
        self.limits.check_body_size(body.len())?;
        let ttl = options
            .time_to_live
            .unwrap_or_else(|| self.limits.default_time_to_live());
        self.limits.check_time_to_live(ttl)?;
        let delay = options
            .visibility_delay
            .unwrap_or_else(chrono::Duration::zero);
        self.limits.check_update_visibility(delay)?;

        self.reconcile_at(now);

        let seq = self.next_seq;
        self.next_seq += 1;

        let message = StoredMessage {
            id: MessageId::new(),
            body,
            inserted_at: now,
            expires_at: now.plus(ttl),
            visible_after: now.plus(delay),
            dequeue_count: 0,
            pop_receipt: None,
        };

        let receipt = EnqueueReceipt {
            message_id: message.id.clone(),
            inserted_at: message.inserted_at,
            expires_at: message.expires_at,
            visible_at: message.visible_after,
        };

        if message.visible_after <= now {
            self.visible.insert(seq);
        } else {
            self.leases.schedule(message.visible_after, seq);
        }
        self.expiries.schedule(message.expires_at, seq);
        self.by_id.insert(message.id.clone(), seq);
        self.messages.insert(seq, message);

        Ok(receipt)
    }

    /// Read up to `max_count` visible messages without leasing them
    pub(crate) fn peek_at(
        &mut self,
        now: Timestamp,
        max_count: u32,
    ) -> Result<Vec<PeekedMessage>, QueueError> {
        self.limits.check_batch_size(max_count)?;
        self.reconcile_at(now);

        Ok(self
            .visible
            .iter()
            .take(max_count as usize)
            .filter_map(|seq| self.messages.get(seq))
            .map(|message| PeekedMessage {
                message_id: message.id.clone(),
                body: message.body.clone(),
                inserted_at: message.inserted_at,
                expires_at: message.expires_at,
                dequeue_count: message.dequeue_count,
            })
            .collect())
    }

    /// Lease up to `max_count` visible messages until `now + visibility_timeout`.
    ///
    /// Each returned message is marked invisible, has its dequeue count
    /// incremented, and carries a freshly issued pop receipt. Returns an
    /// empty vector when nothing is visible; never waits.
    pub(crate) fn retrieve_at(
        &mut self,
        now: Timestamp,
        max_count: u32,
        visibility_timeout: chrono::Duration,
    ) -> Result<Vec<RetrievedMessage>, QueueError> {
        self.limits.check_batch_size(max_count)?;
        self.limits.check_retrieve_visibility(visibility_timeout)?;
        self.reconcile_at(now);

        let selected: Vec<u64> = self
            .visible
            .iter()
            .take(max_count as usize)
            .copied()
            .collect();

        let mut retrieved = Vec::with_capacity(selected.len());
        for seq in selected {
            self.visible.remove(&seq);
            let message = match self.messages.get_mut(&seq) {
                Some(message) => message,
                None => continue,
            };

            message.visible_after = now.plus(visibility_timeout);
            message.dequeue_count += 1;
            let pop_receipt = PopReceipt::issue();
            message.pop_receipt = Some(pop_receipt.clone());
            self.leases.schedule(message.visible_after, seq);

            retrieved.push(RetrievedMessage {
                message_id: message.id.clone(),
                body: message.body.clone(),
                inserted_at: message.inserted_at,
                expires_at: message.expires_at,
                dequeue_count: message.dequeue_count,
                pop_receipt,
                next_visible_at: message.visible_after,
            });
        }

        Ok(retrieved)
    }

    /// Delete a message, authorized by its current pop receipt
    pub(crate) fn delete_message_at(
        &mut self,
        now: Timestamp,
        id: &MessageId,
        pop_receipt: &PopReceipt,
    ) -> Result<(), QueueError> {
        self.reconcile_at(now);

        let seq = self.lookup(id)?;
        let message = self
            .messages
            .get(&seq)
            .ok_or_else(|| QueueError::MessageNotFound {
                message_id: id.to_string(),
            })?;

        if message.pop_receipt.as_ref() != Some(pop_receipt) {
            return Err(QueueError::ReceiptMismatch {
                message_id: id.to_string(),
            });
        }

        self.remove(seq);
        Ok(())
    }

    /// Update a leased message: replace the invisibility window, issue a
    /// fresh receipt, and optionally replace the body.
    ///
    /// A zero `visibility_timeout` makes the message visible immediately.
    pub(crate) fn update_message_at(
        &mut self,
        now: Timestamp,
        id: &MessageId,
        pop_receipt: &PopReceipt,
        new_body: Option<Bytes>,
        visibility_timeout: chrono::Duration,
    ) -> Result<UpdatedMessage, QueueError> {
        self.limits.check_update_visibility(visibility_timeout)?;
        if let Some(body) = &new_body {
            self.limits.check_body_size(body.len())?;
        }
        self.reconcile_at(now);

        let seq = self.lookup(id)?;
        let message = self
            .messages
            .get_mut(&seq)
            .ok_or_else(|| QueueError::MessageNotFound {
                message_id: id.to_string(),
            })?;

        if message.pop_receipt.as_ref() != Some(pop_receipt) {
            return Err(QueueError::ReceiptMismatch {
                message_id: id.to_string(),
            });
        }

        if let Some(body) = new_body {
            message.body = body;
        }
        message.visible_after = now.plus(visibility_timeout);
        let new_receipt = PopReceipt::issue();
        message.pop_receipt = Some(new_receipt.clone());
        let visible_after = message.visible_after;

        if visible_after <= now {
            self.visible.insert(seq);
        } else {
            self.visible.remove(&seq);
            self.leases.schedule(visible_after, seq);
        }

        Ok(UpdatedMessage {
            pop_receipt: new_receipt,
            next_visible_at: visible_after,
        })
    }

    /// Remove all messages unconditionally, leased or not
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.by_id.clear();
        self.visible.clear();
        self.leases.clear();
        self.expiries.clear();
    }

    /// Number of live messages (visible and leased)
    pub(crate) fn live_len(&self) -> usize {
        self.messages.len()
    }

    fn lookup(&self, id: &MessageId) -> Result<u64, QueueError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| QueueError::MessageNotFound {
                message_id: id.to_string(),
            })
    }

    fn remove(&mut self, seq: u64) {
        if let Some(message) = self.messages.remove(&seq) {
            self.by_id.remove(&message.id);
        }
        self.visible.remove(&seq);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
