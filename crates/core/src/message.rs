// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol message values exchanged between peer processes

use serde::{Deserialize, Serialize};

/// Identifies one peer process in the fixed membership set
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub u32);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scalar Lamport timestamp
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LamportTs(pub u64);

impl std::fmt::Display for LamportTs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-sender message sequence number, 1-based and monotonic.
///
/// Sequence numbers exist only so the receiver can reconstruct each sender's
/// send order; they carry no meaning across senders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sequence(pub u64);

impl Sequence {
    pub const FIRST: Sequence = Sequence(1);

    pub fn next(self) -> Sequence {
        Sequence(self.0 + 1)
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three message kinds of the exclusion protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// The sender wants the resource
    Request,
    /// The sender is done with the resource
    Release,
    /// Unconditional acknowledgment of a received request
    Ack,
}

/// An immutable protocol message.
///
/// The request a process records for itself never becomes a `Message`; only
/// traffic between distinct peers is modeled here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: ProcessId,
    pub sequence: Sequence,
    pub timestamp: LamportTs,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(from: ProcessId, sequence: Sequence, timestamp: LamportTs, kind: MessageKind) -> Self {
        Self {
            from,
            sequence,
            timestamp,
            kind,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
