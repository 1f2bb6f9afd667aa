// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-sender causal delivery with an out-of-order backlog
//!
//! The mailbox interleaves messages from different senders arbitrarily, and
//! a single sender's messages may arrive out of order. `CausalInbox` releases
//! messages to the protocol layer strictly in per-sender sequence order,
//! holding early arrivals until the gap before them closes.

use crate::message::{Message, ProcessId, Sequence};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// A sender's sequence regressed below the next expected value.
///
/// A single in-order sender over order-preserving per-peer delivery cannot
/// produce this; it signals a transport or sender bug, and the causal stream
/// from that sender is unusable from here on.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("stale sequence {got} from process {from}: next expected {expected}")]
pub struct OrderingError {
    pub from: ProcessId,
    pub expected: Sequence,
    pub got: Sequence,
}

/// Reorders raw mailbox arrivals into per-sender causal order
#[derive(Clone, Debug, Default)]
pub struct CausalInbox {
    /// Count of messages already delivered, per sender
    delivered: HashMap<ProcessId, u64>,
    /// Messages that arrived before their predecessor, per sender
    backlog: HashMap<ProcessId, BTreeMap<Sequence, Message>>,
}

impl CausalInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a raw arrival.
    ///
    /// Returns the run of messages that became deliverable, in sequence
    /// order; empty when the arrival was held back. A backlog entry released
    /// by this arrival may itself release the next one, so a single accept
    /// can drain several held messages at once.
    pub fn accept(&mut self, message: Message) -> Result<Vec<Message>, OrderingError> {
        let from = message.from;
        let expected = Sequence(self.delivered_count(from) + 1);

        match message.sequence.cmp(&expected) {
            std::cmp::Ordering::Less => Err(OrderingError {
                from,
                expected,
                got: message.sequence,
            }),
            std::cmp::Ordering::Greater => {
                self.backlog.entry(from).or_default().insert(message.sequence, message);
                Ok(Vec::new())
            }
            std::cmp::Ordering::Equal => {
                let mut ready = vec![message];
                let mut count = expected.0;
                if let Some(held) = self.backlog.get_mut(&from) {
                    while let Some(next) = held.remove(&Sequence(count + 1)) {
                        ready.push(next);
                        count += 1;
                    }
                }
                self.delivered.insert(from, count);
                Ok(ready)
            }
        }
    }

    /// How many messages from `from` have been delivered so far
    pub fn delivered_count(&self, from: ProcessId) -> u64 {
        self.delivered.get(&from).copied().unwrap_or(0)
    }

    /// Number of messages currently held across all senders
    pub fn held(&self) -> usize {
        self.backlog.values().map(BTreeMap::len).sum()
    }

    /// True when no sender has a message waiting on a predecessor
    pub fn is_drained(&self) -> bool {
        self.backlog.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
#[path = "causal_tests.rs"]
mod tests;
