// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutual-exclusion protocol engine
//!
//! One `Coordinator` per process. Pure state machine: `transition` consumes
//! an input and returns the successor state plus the effects to execute, in
//! the manner of the other state machines in this workspace. All
//! cross-process interaction happens through `Effect::Send` and incoming
//! `Input::Receive` — coordinators never share state.
//!
//! Entry rule: a process may enter the exclusive section iff its own claim
//! is the minimum of its pending set in `(timestamp, holder)` order, and it
//! has heard from every peer at a logical time at or past its own claim.
//! Requests are acknowledged immediately and unconditionally, so a peer's
//! high-water mark advancing past the claim is proof that the peer has seen
//! it and will order itself accordingly.

use crate::causal::{CausalInbox, OrderingError};
use crate::clock::LamportClock;
use crate::effect::{Effect, Event};
use crate::message::{LamportTs, Message, MessageKind, ProcessId, Sequence};
use crate::pending::{Claim, RequestQueue};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Faults that end the affected process's run.
///
/// Local detection only: peers never learn about each other's faults, the
/// harness observes the failed worker instead.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error("process {process} requested while already asking")]
    AlreadyAsking { process: ProcessId },
    #[error("process {process} requested with no writes remaining")]
    NoWritesRemaining { process: ProcessId },
    #[error("process {process} exited the resource without holding it")]
    NotHolding { process: ProcessId },
}

/// Inputs the runtime feeds a coordinator
#[derive(Clone, Debug)]
pub enum Input {
    /// Start asking for the resource
    Request,
    /// A raw message arrived in this process's mailbox
    Receive(Message),
    /// The exclusive action for the current grant has finished
    Exited,
}

/// The per-process protocol state machine
#[derive(Clone, Debug)]
pub struct Coordinator {
    id: ProcessId,
    /// Fixed membership, excluding this process
    peers: BTreeSet<ProcessId>,
    clock: LamportClock,
    /// Next sequence number to stamp, per destination
    next_seq: HashMap<ProcessId, Sequence>,
    inbox: CausalInbox,
    queue: RequestQueue,
    /// Max timestamp delivered so far, per sender
    high_water: HashMap<ProcessId, LamportTs>,
    /// The claim this process currently has outstanding, if any
    own_claim: Option<Claim>,
    /// Whether `Effect::Enter` was already issued for the current claim
    entered: bool,
    remaining_writes: u32,
}

impl Coordinator {
    /// Build a coordinator for `id` within the given membership.
    /// `id` itself is filtered out of the peer set.
    pub fn new(id: ProcessId, membership: impl IntoIterator<Item = ProcessId>, writes: u32) -> Self {
        let peers = membership.into_iter().filter(|peer| *peer != id).collect();
        Self {
            id,
            peers,
            clock: LamportClock::new(),
            next_seq: HashMap::new(),
            inbox: CausalInbox::new(),
            queue: RequestQueue::new(),
            high_water: HashMap::new(),
            own_claim: None,
            entered: false,
            remaining_writes: writes,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn remaining_writes(&self) -> u32 {
        self.remaining_writes
    }

    pub fn is_asking(&self) -> bool {
        self.own_claim.is_some()
    }

    /// Idle with work left: the control loop should issue a request
    pub fn wants_resource(&self) -> bool {
        self.own_claim.is_none() && self.remaining_writes > 0
    }

    /// Writes exhausted, nothing outstanding, nothing held back.
    /// The process may stop issuing requests; it keeps servicing peers.
    pub fn done_requesting(&self) -> bool {
        self.remaining_writes == 0 && self.own_claim.is_none() && self.inbox.is_drained()
    }

    /// Pure transition: returns the successor state and the effects to run
    pub fn transition(&self, input: Input) -> Result<(Coordinator, Vec<Effect>), ProtocolError> {
        let mut next = self.clone();
        let mut effects = Vec::new();
        match input {
            Input::Request => next.request(&mut effects)?,
            Input::Receive(message) => next.receive(message, &mut effects)?,
            Input::Exited => next.exited(&mut effects)?,
        }
        Ok((next, effects))
    }

    /// Stamp and sequence one outgoing message. Callers own the clock tick.
    fn outgoing(&mut self, to: ProcessId, timestamp: LamportTs, kind: MessageKind) -> Message {
        let sequence = self.next_seq.entry(to).or_insert(Sequence::FIRST);
        let message = Message::new(self.id, *sequence, timestamp, kind);
        *sequence = sequence.next();
        message
    }

    fn request(&mut self, effects: &mut Vec<Effect>) -> Result<(), ProtocolError> {
        if self.own_claim.is_some() {
            return Err(ProtocolError::AlreadyAsking { process: self.id });
        }
        if self.remaining_writes == 0 {
            return Err(ProtocolError::NoWritesRemaining { process: self.id });
        }

        let timestamp = self.clock.stamp();
        let claim = Claim::new(timestamp, self.id);
        self.queue.insert(claim);
        self.own_claim = Some(claim);
        self.entered = false;

        // every copy of the broadcast carries the claim's timestamp; the
        // clock advances once after the loop
        let peers: Vec<ProcessId> = self.peers.iter().copied().collect();
        for peer in peers {
            let message = self.outgoing(peer, timestamp, MessageKind::Request);
            effects.push(Effect::Send { to: peer, message });
        }
        self.clock.tick();

        effects.push(Effect::Emit(Event::RequestIssued {
            process: self.id,
            timestamp,
        }));
        self.evaluate_entry(effects);
        Ok(())
    }

    fn receive(&mut self, message: Message, effects: &mut Vec<Effect>) -> Result<(), ProtocolError> {
        if !self.peers.contains(&message.from) {
            effects.push(Effect::Emit(Event::PeerIgnored {
                process: self.id,
                from: message.from,
            }));
            return Ok(());
        }

        let ready = self.inbox.accept(message)?;
        if ready.is_empty() {
            effects.push(Effect::Emit(Event::MessageHeld {
                process: self.id,
                from: message.from,
                sequence: message.sequence,
            }));
            return Ok(());
        }
        for delivered in ready {
            self.deliver(delivered, effects);
        }
        Ok(())
    }

    /// Apply one causally-delivered message
    fn deliver(&mut self, message: Message, effects: &mut Vec<Effect>) {
        self.clock.observe(message.timestamp);

        let high_water = self.high_water.entry(message.from).or_default();
        if message.timestamp > *high_water {
            *high_water = message.timestamp;
        }

        match message.kind {
            MessageKind::Request => {
                self.queue.insert(Claim::new(message.timestamp, message.from));
                effects.push(Effect::Emit(Event::RequestQueued {
                    process: self.id,
                    from: message.from,
                    timestamp: message.timestamp,
                }));

                // acknowledge immediately, never defer
                let timestamp = self.clock.stamp();
                let ack = self.outgoing(message.from, timestamp, MessageKind::Ack);
                self.clock.tick();
                effects.push(Effect::Send {
                    to: message.from,
                    message: ack,
                });
                effects.push(Effect::Emit(Event::AckSent {
                    process: self.id,
                    to: message.from,
                }));
            }
            MessageKind::Release => {
                self.queue.release(message.from, message.timestamp);
                effects.push(Effect::Emit(Event::ReleaseObserved {
                    process: self.id,
                    from: message.from,
                }));
            }
            MessageKind::Ack => {}
        }

        self.evaluate_entry(effects);
    }

    /// Re-evaluate the entry condition; at most one `Enter` per claim
    fn evaluate_entry(&mut self, effects: &mut Vec<Effect>) {
        if self.entered {
            return;
        }
        let Some(own) = self.own_claim else {
            return;
        };
        if self.queue.first() != Some(&own) {
            return;
        }
        let heard_from_all = self.peers.iter().all(|peer| {
            self.high_water
                .get(peer)
                .is_some_and(|seen| *seen >= own.timestamp)
        });
        if !heard_from_all {
            return;
        }

        self.entered = true;
        effects.push(Effect::Enter);
        effects.push(Effect::Emit(Event::AccessGranted {
            process: self.id,
            timestamp: own.timestamp,
        }));
    }

    fn exited(&mut self, effects: &mut Vec<Effect>) -> Result<(), ProtocolError> {
        if !self.entered {
            return Err(ProtocolError::NotHolding { process: self.id });
        }
        let Some(own) = self.own_claim.take() else {
            return Err(ProtocolError::NotHolding { process: self.id });
        };

        self.queue.remove(&own);
        self.entered = false;
        self.remaining_writes -= 1;

        let timestamp = self.clock.stamp();
        let peers: Vec<ProcessId> = self.peers.iter().copied().collect();
        for peer in peers {
            let message = self.outgoing(peer, timestamp, MessageKind::Release);
            effects.push(Effect::Send { to: peer, message });
        }
        self.clock.tick();

        effects.push(Effect::Emit(Event::AccessReleased {
            process: self.id,
            remaining: self.remaining_writes,
        }));
        if self.remaining_writes == 0 {
            effects.push(Effect::Emit(Event::WriterFinished { process: self.id }));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    #[cfg(test)]
    pub(crate) fn clock_value(&self) -> LamportTs {
        self.clock.stamp()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
