// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lockstep-core: protocol state machines for decentralized mutual exclusion
//!
//! This crate provides:
//! - Lamport clocks and per-sender causal delivery
//! - The ordered pending-request set shared by every coordinator
//! - The request/ack/release coordinator state machine
//! - Effects and events for the runtime to execute and observe
//!
//! Everything here is pure: no channels, no clocks but logical ones, no
//! shared state. The engine crate wires coordinators to mailboxes and the
//! protected resource.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod causal;
pub mod clock;
pub mod coordinator;
pub mod effect;
pub mod message;
pub mod pending;

// Re-exports
pub use causal::{CausalInbox, OrderingError};
pub use clock::LamportClock;
pub use coordinator::{Coordinator, Input, ProtocolError};
pub use effect::{Effect, Event};
pub use message::{LamportTs, Message, MessageKind, ProcessId, Sequence};
pub use pending::{Claim, RequestQueue};
