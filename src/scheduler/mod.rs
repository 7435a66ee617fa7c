//! Scheduled-send module.
//!
//! Fires delayed reminders without blocking the command router and
//! sends bounded bursts of repeated messages.

mod runner;

pub use runner::{PendingReminder, SendScheduler};
