//! Command handling module.
//!
//! Parses slash commands from chat messages, runs them and sends the
//! responses back to the originating chat.

mod args;
mod context;
mod handler;
pub mod templates;
mod types;

pub use args::{ReminderParseError, ReminderRequest, SpamParseError, SpamRequest};
pub use context::ChatContext;
pub use handler::CommandRouter;
pub use types::{BotCommand, CommandResult};
