//! Configuration module for the bot.
//!
//! Handles loading bot settings and bridge connection details
//! from the environment.

mod settings;

pub use settings::{BotSettings, BridgeConfig, ConfigError};

use std::time::Duration;

/// Upper bound (inclusive) on the number of messages `/spam` may send.
pub const MAX_SPAM_COUNT: u32 = 10;

/// Longest delay `/remindme` accepts (one year).
pub const MAX_REMINDER_DELAY: Duration = Duration::from_secs(365 * 24 * 3600);
