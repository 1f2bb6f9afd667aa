// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One process's control loop
//!
//! The worker owns a coordinator and is the only thing that mutates it.
//! Suspension is condition-driven: the loop parks on its mailbox or the
//! shutdown watch, never on timed polling. The only sleeps are the
//! simulated hold inside the resource and the optional think-time jitter,
//! neither of which correctness depends on.

use crate::events::EventBus;
use crate::mailbox::{Mailbox, Outbound};
use crate::resource::{ResourceError, SharedCounter};
use lockstep_core::{Coordinator, Effect, Event, Input, ProcessId, ProtocolError};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Faults that terminate one worker. Peers are never told; the harness
/// observes the failed task.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("protocol fault: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("resource fault: {0}")]
    Resource(#[from] ResourceError),
}

/// What one worker did over its run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: ProcessId,
    pub grants: u32,
}

/// Drives one coordinator against the shared mesh
pub struct Worker {
    coordinator: Coordinator,
    mailbox: Mailbox,
    outbound: Outbound,
    resource: Arc<SharedCounter>,
    bus: EventBus,
    shutdown: watch::Receiver<bool>,
    done: mpsc::UnboundedSender<ProcessId>,
    jitter: Duration,
    reported_done: bool,
    grants: u32,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Coordinator,
        mailbox: Mailbox,
        outbound: Outbound,
        resource: Arc<SharedCounter>,
        bus: EventBus,
        shutdown: watch::Receiver<bool>,
        done: mpsc::UnboundedSender<ProcessId>,
        jitter: Duration,
    ) -> Self {
        Self {
            coordinator,
            mailbox,
            outbound,
            resource,
            bus,
            shutdown,
            done,
            jitter,
            reported_done: false,
            grants: 0,
        }
    }

    /// Run until this process is done requesting and the harness signals
    /// that every peer is as well
    pub async fn run(mut self) -> Result<WorkerStats, WorkerError> {
        loop {
            if self.coordinator.wants_resource() {
                self.think_time().await;
                self.apply(Input::Request).await?;
                continue;
            }

            if !self.reported_done && self.coordinator.done_requesting() {
                // the harness may already be gone in fault scenarios
                let _ = self.done.send(self.coordinator.id());
                self.reported_done = true;
                tracing::debug!(process = %self.coordinator.id(), "done requesting");
            }

            tokio::select! {
                message = self.mailbox.recv() => match message {
                    Some(message) => self.apply(Input::Receive(message)).await?,
                    None => break,
                },
                _ = self.shutdown.changed() => {
                    // every process is done; service the stragglers and leave
                    while let Some(message) = self.mailbox.try_recv() {
                        self.apply(Input::Receive(message)).await?;
                    }
                    break;
                }
            }
        }

        Ok(WorkerStats {
            id: self.coordinator.id(),
            grants: self.grants,
        })
    }

    /// Feed one input through the coordinator and execute the effects.
    /// Entering the resource feeds `Exited` back in once the action is done.
    async fn apply(&mut self, input: Input) -> Result<(), WorkerError> {
        let mut inputs = VecDeque::from([input]);
        while let Some(input) = inputs.pop_front() {
            let (next, effects) = self.coordinator.transition(input)?;
            self.coordinator = next;

            for effect in effects {
                match effect {
                    Effect::Send { to, message } => {
                        if let Err(error) = self.outbound.send(to, message) {
                            tracing::warn!(
                                process = %self.coordinator.id(),
                                %error,
                                "dropping outbound message"
                            );
                        }
                    }
                    Effect::Enter => {
                        let value = self.resource.exclusive().await?;
                        self.grants += 1;
                        tracing::debug!(
                            process = %self.coordinator.id(),
                            value,
                            "wrote the resource"
                        );
                        inputs.push_back(Input::Exited);
                    }
                    Effect::Emit(event) => {
                        if let Event::PeerIgnored { from, .. } = &event {
                            tracing::warn!(
                                process = %event.process(),
                                from = %from,
                                "dropping message from unknown peer"
                            );
                        } else {
                            tracing::trace!(
                                process = %event.process(),
                                event = %event.name(),
                                "protocol event"
                            );
                        }
                        self.bus.publish(&event);
                    }
                }
            }
        }
        Ok(())
    }

    async fn think_time(&self) {
        if self.jitter.is_zero() {
            return;
        }
        let bound = self.jitter.as_millis() as u64;
        let millis = rand::thread_rng().gen_range(0..=bound);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
