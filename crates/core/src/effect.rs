// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events emitted by coordinator transitions

use crate::message::{LamportTs, Message, ProcessId, Sequence};
use serde::{Deserialize, Serialize};

/// Side effects a coordinator transition requests.
///
/// The state machine never touches a channel or the resource itself; the
/// runtime executes these in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Hand a message to the named peer's mailbox
    Send { to: ProcessId, message: Message },
    /// The entry condition holds; perform the exclusive action
    Enter,
    /// Surface a protocol event to observers
    Emit(Event),
}

/// Events emitted by coordinators
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// This process broadcast a request for the resource
    RequestIssued {
        process: ProcessId,
        timestamp: LamportTs,
    },
    /// A peer's request entered the local pending set
    RequestQueued {
        process: ProcessId,
        from: ProcessId,
        timestamp: LamportTs,
    },
    /// An acknowledgment went back to a requesting peer
    AckSent { process: ProcessId, to: ProcessId },
    /// A peer's release retired its pending claim
    ReleaseObserved { process: ProcessId, from: ProcessId },
    /// An arrival was held back until its causal predecessor shows up
    MessageHeld {
        process: ProcessId,
        from: ProcessId,
        sequence: Sequence,
    },
    /// The entry condition was satisfied
    AccessGranted {
        process: ProcessId,
        timestamp: LamportTs,
    },
    /// The exclusive action finished and the release was broadcast
    AccessReleased { process: ProcessId, remaining: u32 },
    /// This process has no writes left to perform
    WriterFinished { process: ProcessId },
    /// A message from outside the configured membership was dropped
    PeerIgnored { process: ProcessId, from: ProcessId },
}

impl Event {
    /// Event name for pattern matching, "category:action"
    pub fn name(&self) -> String {
        match self {
            Event::RequestIssued { .. } => "request:issued",
            Event::RequestQueued { .. } => "request:queued",
            Event::AckSent { .. } => "ack:sent",
            Event::ReleaseObserved { .. } => "release:observed",
            Event::MessageHeld { .. } => "inbox:held",
            Event::AccessGranted { .. } => "access:granted",
            Event::AccessReleased { .. } => "access:released",
            Event::WriterFinished { .. } => "writer:finished",
            Event::PeerIgnored { .. } => "peer:ignored",
        }
        .to_string()
    }

    /// The process that emitted this event
    pub fn process(&self) -> ProcessId {
        match self {
            Event::RequestIssued { process, .. }
            | Event::RequestQueued { process, .. }
            | Event::AckSent { process, .. }
            | Event::ReleaseObserved { process, .. }
            | Event::MessageHeld { process, .. }
            | Event::AccessGranted { process, .. }
            | Event::AccessReleased { process, .. }
            | Event::WriterFinished { process }
            | Event::PeerIgnored { process, .. } => *process,
        }
    }
}
