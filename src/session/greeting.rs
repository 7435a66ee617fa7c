//! Away-message de-duplication.
//!
//! A sender moves through three states: unknown, claimed (a greeting send is
//! in flight) and greeted. Claiming is a single check-and-insert under one
//! lock, so two messages racing from the same sender cannot both win. A
//! claim that is dropped without being confirmed releases the sender again,
//! which keeps "greeted" reserved for senders whose greeting was delivered.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

#[derive(Debug, Default)]
struct GreetState {
    greeted: HashSet<String>,
    in_flight: HashSet<String>,
}

/// Tracks which senders already received the automatic away-message.
#[derive(Debug, Default)]
pub struct GreetingTracker {
    state: Mutex<GreetState>,
}

impl GreetingTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GreetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks whether the sender was already greeted.
    pub fn is_greeted(&self, sender: &str) -> bool {
        self.lock().greeted.contains(sender)
    }

    /// Atomically decides whether the sender should be greeted.
    ///
    /// Returns a claim only when the sender is not a known contact, has not
    /// been greeted, and has no greeting in flight.
    pub fn try_claim(&self, sender: &str, is_known_contact: bool) -> Option<GreetingClaim<'_>> {
        if is_known_contact {
            return None;
        }

        let mut state = self.lock();
        if state.greeted.contains(sender) || state.in_flight.contains(sender) {
            return None;
        }
        state.in_flight.insert(sender.to_owned());

        Some(GreetingClaim {
            tracker: self,
            sender: sender.to_owned(),
            confirmed: false,
        })
    }

    /// Records that the sender received the greeting. Idempotent.
    pub fn mark_greeted(&self, sender: &str) {
        let mut state = self.lock();
        state.in_flight.remove(sender);
        if state.greeted.insert(sender.to_owned()) {
            debug!("Recorded greeting for {}", sender);
        }
    }

    fn release(&self, sender: &str) {
        self.lock().in_flight.remove(sender);
    }

    /// Number of greeted senders.
    pub fn len(&self) -> usize {
        self.lock().greeted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive right to greet one sender.
#[derive(Debug)]
pub struct GreetingClaim<'a> {
    tracker: &'a GreetingTracker,
    sender: String,
    confirmed: bool,
}

impl GreetingClaim<'_> {
    /// Confirms the greeting was sent.
    pub fn confirm(mut self) {
        self.tracker.mark_greeted(&self.sender);
        self.confirmed = true;
    }
}

impl Drop for GreetingClaim<'_> {
    fn drop(&mut self) {
        if !self.confirmed {
            self.tracker.release(&self.sender);
        }
    }
}
