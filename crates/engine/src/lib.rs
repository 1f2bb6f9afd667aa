// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lockstep-engine: runtime wiring for the exclusion protocol
//!
//! This crate owns everything the pure core must not: mailboxes, the shared
//! counter, tokio tasks, shutdown sequencing, and event fan-out. One
//! `Simulation` builds the mesh from a `SimConfig`, runs one `Worker` per
//! process, and reports the final counter for verification.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod events;
pub mod mailbox;
pub mod resource;
pub mod sim;
pub mod worker;

// Re-exports
pub use config::{ConfigError, SimConfig};
pub use events::{EventBus, EventPattern, EventReceiver};
pub use mailbox::{Mailbox, MailboxError, Outbound, Switchboard};
pub use resource::{ResourceError, SharedCounter};
pub use sim::{SimError, SimReport, Simulation};
pub use worker::{Worker, WorkerError, WorkerStats};
