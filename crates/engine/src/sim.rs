// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation harness: wires processes together and drives a full run
//!
//! One tokio task per process. The harness owns shutdown sequencing: each
//! worker reports once it is done requesting, and when all of them have,
//! the shutdown watch flips and everyone drains out. Protocol state never
//! leaves the workers; the harness only sees done-notices and join results.

use crate::config::{ConfigError, SimConfig};
use crate::events::EventBus;
use crate::mailbox::Switchboard;
use crate::resource::SharedCounter;
use crate::worker::{Worker, WorkerError, WorkerStats};
use lockstep_core::{Coordinator, ProcessId};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("process {id} failed: {source}")]
    Worker { id: ProcessId, source: WorkerError },
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Outcome of a completed run
#[derive(Clone, Debug)]
pub struct SimReport {
    /// Final value of the shared counter
    pub final_count: u64,
    /// What the configuration says the counter must reach
    pub expected: u64,
    /// Grants each process received
    pub grants: BTreeMap<ProcessId, u32>,
    /// Highest concurrent occupancy the resource ever saw; above 1 means
    /// the exclusion property failed
    pub peak_occupancy: u32,
}

impl SimReport {
    pub fn counter_matches(&self) -> bool {
        self.final_count == self.expected
    }
}

/// A configured, not-yet-started simulation
pub struct Simulation {
    config: SimConfig,
    bus: EventBus,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            bus: EventBus::new(),
        })
    }

    /// Subscribe to protocol events before the run starts
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub async fn run(self) -> Result<SimReport, SimError> {
        let membership: Vec<ProcessId> =
            (0..self.config.processes).map(ProcessId).collect();
        let total = membership.len();

        let resource = Arc::new(SharedCounter::new(self.config.hold));
        let mut switchboard = Switchboard::new(membership.iter().copied());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        tracing::info!(
            processes = total,
            expected = self.config.expected_total(),
            "starting simulation"
        );

        let mut tasks: JoinSet<Result<WorkerStats, (ProcessId, WorkerError)>> = JoinSet::new();
        for id in membership.iter().copied() {
            let coordinator =
                Coordinator::new(id, membership.iter().copied(), self.config.writes_for(id));
            let Some(mailbox) = switchboard.take_mailbox(id) else {
                // membership ids are distinct by construction
                continue;
            };
            let worker = Worker::new(
                coordinator,
                mailbox,
                switchboard.outbound_for(id),
                resource.clone(),
                self.bus.clone(),
                shutdown_rx.clone(),
                done_tx.clone(),
                self.config.jitter,
            );
            tasks.spawn(async move { worker.run().await.map_err(|source| (id, source)) });
        }
        drop(done_tx);
        drop(switchboard);
        drop(shutdown_rx);

        let mut grants = BTreeMap::new();
        let mut done = 0usize;
        loop {
            tokio::select! {
                notice = done_rx.recv(), if done < total => {
                    match notice {
                        Some(id) => {
                            done += 1;
                            tracing::debug!(process = %id, done, total, "process done requesting");
                            if done == total {
                                let _ = shutdown_tx.send(true);
                            }
                        }
                        // every worker is gone; the join arm settles the run
                        None => done = total,
                    }
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(Ok(stats))) => {
                        grants.insert(stats.id, stats.grants);
                    }
                    Some(Ok(Err((id, source)))) => {
                        tracing::error!(process = %id, error = %source, "worker failed");
                        return Err(SimError::Worker { id, source });
                    }
                    Some(Err(join_error)) => return Err(SimError::Join(join_error)),
                },
            }
        }

        let report = SimReport {
            final_count: resource.value(),
            expected: self.config.expected_total(),
            grants,
            peak_occupancy: resource.peak_occupancy(),
        };
        tracing::info!(
            final_count = report.final_count,
            expected = report.expected,
            "simulation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "sim_tests.rs"]
mod tests;
