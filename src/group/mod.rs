//! Group action module.
//!
//! Performs membership mutations (kick, promote) in group chats where
//! the bot account holds admin rights.

mod executor;

pub use executor::{GroupAction, GroupActionError, GroupActionExecutor};
