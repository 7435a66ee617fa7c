//! Bot session module.
//!
//! Holds the process-lifetime state: start time, own identity and the
//! set of senders that already received the away-message.

mod context;
mod greeting;

pub use context::BotSession;
pub use greeting::{GreetingClaim, GreetingTracker};
