// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol event routing
//!
//! Coordinators emit `Event`s through `Effect::Emit`; workers publish them
//! here so tests and the CLI can observe a run without touching protocol
//! state. Event names are always `category:action`, which keeps pattern
//! matching to three shapes: exact, `category:*`, and match-all.

use lockstep_core::Event;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Receiver for events routed to one subscriber
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// A name filter over `category:action` event names
#[derive(Clone, Debug)]
pub struct EventPattern(String);

impl EventPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn matches(&self, event_name: &str) -> bool {
        match self.0.as_str() {
            "" => false,
            "*" | "**" => true,
            pattern => match pattern.strip_suffix(":*") {
                Some(category) => event_name
                    .split_once(':')
                    .is_some_and(|(c, _)| c == category),
                None => pattern == event_name,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct Tap {
    patterns: Vec<EventPattern>,
    sender: mpsc::UnboundedSender<Event>,
}

/// Routes published events to every subscriber whose patterns match
#[derive(Clone, Default)]
pub struct EventBus {
    taps: Arc<RwLock<HashMap<String, Tap>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe under a name; a later subscribe with the same name
    /// replaces the earlier one
    pub fn subscribe(&self, name: impl Into<String>, patterns: &[&str]) -> EventReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tap = Tap {
            patterns: patterns.iter().map(|p| EventPattern::new(*p)).collect(),
            sender,
        };
        let mut taps = self.taps.write().unwrap_or_else(|e| e.into_inner());
        taps.insert(name.into(), tap);
        receiver
    }

    pub fn unsubscribe(&self, name: &str) {
        let mut taps = self.taps.write().unwrap_or_else(|e| e.into_inner());
        taps.remove(name);
    }

    /// Fan the event out; subscribers that fell behind or went away are
    /// skipped silently
    pub fn publish(&self, event: &Event) {
        let name = event.name();
        let taps = self.taps.read().unwrap_or_else(|e| e.into_inner());
        for tap in taps.values() {
            if tap.patterns.iter().any(|p| p.matches(&name)) {
                let _ = tap.sender.send(event.clone());
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.taps.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
