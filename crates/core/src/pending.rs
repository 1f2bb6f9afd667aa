// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The locally ordered pending-request set

use crate::message::{LamportTs, ProcessId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One outstanding request for the resource.
///
/// Claims order by `(timestamp, holder)` ascending; the holder id breaks
/// timestamp ties, so the order is total and every winner deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Claim {
    pub timestamp: LamportTs,
    pub holder: ProcessId,
}

impl Claim {
    pub fn new(timestamp: LamportTs, holder: ProcessId) -> Self {
        Self { timestamp, holder }
    }
}

/// A process's view of who currently wants the resource, in grant order.
///
/// Invariant: at most one active claim per holder. Causal per-sender
/// delivery upholds it — a holder's release is always delivered before its
/// next request.
#[derive(Clone, Debug, Default)]
pub struct RequestQueue {
    claims: BTreeSet<Claim>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a claim unless the holder already has one pending.
    /// Returns whether the claim was inserted.
    pub fn insert(&mut self, claim: Claim) -> bool {
        if self.contains_holder(claim.holder) {
            return false;
        }
        self.claims.insert(claim)
    }

    /// Remove the holder's oldest claim stamped at or before `up_to`.
    ///
    /// One release removes at most one claim. Returns the removed claim.
    pub fn release(&mut self, holder: ProcessId, up_to: LamportTs) -> Option<Claim> {
        let hit = self
            .claims
            .iter()
            .copied()
            .find(|claim| claim.holder == holder && claim.timestamp <= up_to)?;
        self.claims.remove(&hit);
        Some(hit)
    }

    /// Remove an exact claim (a process retiring its own entry)
    pub fn remove(&mut self, claim: &Claim) -> bool {
        self.claims.remove(claim)
    }

    /// The earliest claim in `(timestamp, holder)` order
    pub fn first(&self) -> Option<&Claim> {
        self.claims.first()
    }

    pub fn contains_holder(&self, holder: ProcessId) -> bool {
        self.claims.iter().any(|claim| claim.holder == holder)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter()
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
