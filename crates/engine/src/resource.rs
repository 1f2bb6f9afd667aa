// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The protected counter and its reentrancy tripwire
//!
//! The occupancy gauge detects protocol violations; it never provides
//! mutual exclusion. Exclusion is the coordinators' job — if two processes
//! ever overlap in `exclusive`, the safety property has already failed and
//! the run must fail loudly.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("exclusive section entered while already occupied")]
    Reentrancy,
}

/// A counter that only one process at a time may write
pub struct SharedCounter {
    value: AtomicU64,
    occupancy: AtomicU32,
    peak_occupancy: AtomicU32,
    hold: Duration,
}

impl SharedCounter {
    /// `hold` simulates the work done while the resource is held
    pub fn new(hold: Duration) -> Self {
        Self {
            value: AtomicU64::new(0),
            occupancy: AtomicU32::new(0),
            peak_occupancy: AtomicU32::new(0),
            hold,
        }
    }

    /// Perform the exclusive action: hold the resource, then increment.
    /// Returns the counter value after the increment.
    pub async fn exclusive(&self) -> Result<u64, ResourceError> {
        let occupants = self.occupancy.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_occupancy.fetch_max(occupants, Ordering::SeqCst);
        if occupants > 1 {
            self.occupancy.fetch_sub(1, Ordering::SeqCst);
            return Err(ResourceError::Reentrancy);
        }

        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        let value = self.value.fetch_add(1, Ordering::SeqCst) + 1;

        self.occupancy.fetch_sub(1, Ordering::SeqCst);
        Ok(value)
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Highest concurrent occupancy ever observed; must stay at 1 for any
    /// run that actually wrote
    pub fn peak_occupancy(&self) -> u32 {
        self.peak_occupancy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
