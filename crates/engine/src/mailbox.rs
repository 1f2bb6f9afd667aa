// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process mailboxes and the switchboard that wires them
//!
//! Every process owns exactly one mailbox (its receiver) and an outbound
//! handle per peer. No process ever reaches into another's internals — the
//! only cross-process objects are the sender handles. The channel preserves
//! each sender's push order to a given destination; cross-sender order is
//! reconstructed by the causal inbox, not here.

use lockstep_core::{Message, ProcessId};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("no mailbox configured for process {0}")]
    UnknownDestination(ProcessId),
    #[error("mailbox of process {0} is closed")]
    Closed(ProcessId),
}

/// The receiving half of one process's mailbox
pub struct Mailbox {
    owner: ProcessId,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Mailbox {
    pub fn owner(&self) -> ProcessId {
        self.owner
    }

    /// Wait for the next message; `None` once every sender handle is gone
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Take a message without waiting, if one is ready
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}

/// One process's outbound send path
#[derive(Clone)]
pub struct Outbound {
    senders: HashMap<ProcessId, mpsc::UnboundedSender<Message>>,
}

impl Outbound {
    pub fn send(&self, to: ProcessId, message: Message) -> Result<(), MailboxError> {
        let sender = self
            .senders
            .get(&to)
            .ok_or(MailboxError::UnknownDestination(to))?;
        sender.send(message).map_err(|_| MailboxError::Closed(to))
    }
}

/// Builds the full mesh of mailboxes for a membership set
pub struct Switchboard {
    mailboxes: HashMap<ProcessId, Mailbox>,
    senders: HashMap<ProcessId, mpsc::UnboundedSender<Message>>,
}

impl Switchboard {
    pub fn new(membership: impl IntoIterator<Item = ProcessId>) -> Self {
        let mut mailboxes = HashMap::new();
        let mut senders = HashMap::new();
        for id in membership {
            let (tx, rx) = mpsc::unbounded_channel();
            mailboxes.insert(
                id,
                Mailbox {
                    owner: id,
                    receiver: rx,
                },
            );
            senders.insert(id, tx);
        }
        Self { mailboxes, senders }
    }

    /// Hand the process its own mailbox; each can be taken once
    pub fn take_mailbox(&mut self, id: ProcessId) -> Option<Mailbox> {
        self.mailboxes.remove(&id)
    }

    /// Outbound handles for `id`: every destination except itself
    pub fn outbound_for(&self, id: ProcessId) -> Outbound {
        let senders = self
            .senders
            .iter()
            .filter(|(peer, _)| **peer != id)
            .map(|(peer, tx)| (*peer, tx.clone()))
            .collect();
        Outbound { senders }
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
