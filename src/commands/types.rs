//! Command types and definitions.

use std::fmt;

/// Available bot commands.
///
/// Keywords match case-insensitively; argument text keeps its casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Show the command listing (`/help`, `/start`).
    Help,

    /// Liveness check naming the current chat.
    Ping,

    /// Show time elapsed since process start.
    Uptime,

    /// Show the current local time.
    Time,

    Joke,
    Quote,

    /// Show bot metadata and the current chat.
    Info,

    /// Show the sender's ids and chat context.
    WhoAmI,

    /// Show chat context and the message timestamp.
    ChatInfo,

    /// Echo the text after `/echo `.
    Echo(String),

    /// Roll a number in 1..=100.
    Roll,

    Restart,
    Shutdown,

    /// Mention every participant of a group.
    TagAll,

    /// Remove the mentioned participants from a group.
    Kick,

    /// Make the mentioned participants group admins.
    Promote,

    /// Raw arguments of `/remindme`.
    RemindMe(String),

    /// Raw arguments of `/spam`.
    Spam(String),

    /// A slash-prefixed message that matched nothing, trimmed but otherwise
    /// as typed.
    Unknown(String),
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Returns `None` if the message does not start with `/`. Argument text
    /// is taken from the message as sent, so trailing whitespace survives.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let trimmed = text.trim_end();

        if !trimmed.starts_with('/') {
            return None;
        }

        let key = trimmed.to_lowercase();

        let command = match key.as_str() {
            "/help" | "/start" => Self::Help,
            "/ping" => Self::Ping,
            "/uptime" => Self::Uptime,
            "/time" => Self::Time,
            "/joke" => Self::Joke,
            "/quote" => Self::Quote,
            "/info" => Self::Info,
            "/whoami" => Self::WhoAmI,
            "/chatinfo" => Self::ChatInfo,
            "/echo" => Self::Echo(String::new()),
            "/restart" => Self::Restart,
            "/shutdown" => Self::Shutdown,
            "/tagall" => Self::TagAll,
            "/kick" => Self::Kick,
            "/promote" => Self::Promote,
            "/roll" => Self::Roll,
            "/remindme" => Self::RemindMe(String::new()),
            "/spam" => Self::Spam(String::new()),
            _ => Self::parse_with_args(text),
        };

        Some(command)
    }

    /// Matches commands that take text after a mandatory space.
    fn parse_with_args(text: &str) -> Self {
        if let Some(rest) = strip_keyword(text, "/echo ") {
            return Self::Echo(rest.to_owned());
        }
        if strip_keyword(text, "/kick ").is_some() {
            return Self::Kick;
        }
        if strip_keyword(text, "/promote ").is_some() {
            return Self::Promote;
        }
        if let Some(rest) = strip_keyword(text, "/remindme ") {
            return Self::RemindMe(rest.to_owned());
        }
        if let Some(rest) = strip_keyword(text, "/spam ") {
            return Self::Spam(rest.to_owned());
        }

        Self::Unknown(text.trim_end().to_owned())
    }

    /// Returns the command name as it appears in help.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Ping => "ping",
            Self::Uptime => "uptime",
            Self::Time => "time",
            Self::Joke => "joke",
            Self::Quote => "quote",
            Self::Info => "info",
            Self::WhoAmI => "whoami",
            Self::ChatInfo => "chatinfo",
            Self::Echo(_) => "echo",
            Self::Roll => "roll",
            Self::Restart => "restart",
            Self::Shutdown => "shutdown",
            Self::TagAll => "tagall",
            Self::Kick => "kick",
            Self::Promote => "promote",
            Self::RemindMe(_) => "remindme",
            Self::Spam(_) => "spam",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo(text) => write!(f, "/echo {text}"),
            Self::RemindMe(args) => write!(f, "/remindme {args}"),
            Self::Spam(args) => write!(f, "/spam {args}"),
            Self::Unknown(text) => write!(f, "{text}"),
            _ => write!(f, "/{}", self.name()),
        }
    }
}

/// Strips an ASCII command keyword case-insensitively, keeping the rest as typed.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        text.get(keyword.len()..)
    } else {
        None
    }
}

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command was successful.
    pub success: bool,

    /// Response to send to the chat. `None` when the handler already sent
    /// everything it needed to.
    pub message: Option<String>,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    /// Creates a successful result with nothing left to send.
    #[must_use]
    pub const fn handled() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
