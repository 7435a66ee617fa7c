//! Argument parsing for commands that take structured arguments.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::config::{MAX_REMINDER_DELAY, MAX_SPAM_COUNT};

#[allow(clippy::expect_used)]
static TIME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([smh])$").expect("valid time token pattern"));

/// Errors for `/remindme` arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReminderParseError {
    #[error("missing time or message")]
    Usage,

    #[error("invalid time token: {0}")]
    InvalidTime(String),
}

/// Errors for `/spam` arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpamParseError {
    #[error("missing count or message")]
    Usage,

    #[error("count out of range: {0}")]
    CountOutOfRange(String),
}

/// Parsed `/remindme <duration><unit> <text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    /// The time token as typed, e.g. `10m`.
    pub time_token: String,
    pub delay: Duration,
    pub message: String,
}

impl ReminderRequest {
    /// Parses the text following `/remindme `.
    pub fn parse(args: &str) -> Result<Self, ReminderParseError> {
        let (time_token, message) = args
            .trim()
            .split_once(char::is_whitespace)
            .ok_or(ReminderParseError::Usage)?;

        let message = message.trim_start();
        if message.is_empty() {
            return Err(ReminderParseError::Usage);
        }

        let delay = parse_time_token(time_token)
            .ok_or_else(|| ReminderParseError::InvalidTime(time_token.to_owned()))?;

        Ok(Self {
            time_token: time_token.to_owned(),
            delay,
            message: message.to_owned(),
        })
    }
}

/// Parses `<digits><s|m|h>` into a duration. Returns `None` on a malformed
/// token or a delay longer than `MAX_REMINDER_DELAY`.
pub fn parse_time_token(token: &str) -> Option<Duration> {
    let caps = TIME_TOKEN.captures(token)?;
    let value: u64 = caps[1].parse().ok()?;
    let multiplier = match &caps[2] {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => return None,
    };
    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .filter(|delay| *delay <= MAX_REMINDER_DELAY)
}

/// Parsed `/spam <count> <text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpamRequest {
    pub count: u32,
    pub message: String,
}

impl SpamRequest {
    /// Parses the text following `/spam `.
    ///
    /// The count must lie in `1..=MAX_SPAM_COUNT`.
    pub fn parse(args: &str) -> Result<Self, SpamParseError> {
        let (count_token, message) = args
            .trim_start()
            .split_once(' ')
            .ok_or(SpamParseError::Usage)?;

        if message.trim().is_empty() {
            return Err(SpamParseError::Usage);
        }

        let count = count_token
            .parse::<u32>()
            .ok()
            .filter(|c| (1..=MAX_SPAM_COUNT).contains(c))
            .ok_or_else(|| SpamParseError::CountOutOfRange(count_token.to_owned()))?;

        Ok(Self {
            count,
            message: message.to_owned(),
        })
    }
}
