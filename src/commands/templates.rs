//! Response texts.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::MAX_SPAM_COUNT;
use crate::messaging::ChatKind;

pub const BOT_NAME: &str = "WhatsApp Universal Bot";

pub const AWAY_MESSAGE: &str = "Hello 👋, it seems like I'm not online right now. \
But hey, you can try my bot with the /help command in the meanwhile, \
I'll return as soon as possible, take care <3.";

pub const STARTUP_NOTICE: &str =
    "🤖 Universal Bot is now online! Send /help in any chat for commands.";

pub const APOLOGY: &str = "❌ Sorry, something went wrong. Please try again.";

pub const GROUP_ONLY: &str = "⚠️ This command only works in groups!";

pub const RESTARTING: &str = "♻️ Restarting the bot...";
pub const SHUTTING_DOWN: &str = "🛑 Shutting down the bot...";

pub const REMINDME_USAGE: &str =
    "❗ Usage: /remindme <time> <message>\nExample: /remindme 10m Take a break";
pub const REMINDME_BAD_TIME: &str =
    "❗ Invalid time format! Use s=seconds, m=minutes, h=hours. Example: 10m";

pub const SPAM_USAGE: &str = "❗ Usage: /spam <count> <message>";

pub const JOKES: &[&str] = &[
    "Why don't scientists trust atoms? Because they make up everything!",
    "Why did the scarecrow win an award? He was outstanding in his field!",
    "Why don't eggs tell jokes? They'd crack each other up!",
    "What do you call a bear with no teeth? A gummy bear!",
    "Why did the math book look so sad? Because it had too many problems!",
    "What do you call a fake noodle? An impasta!",
    "Why don't skeletons fight each other? They don't have the guts!",
    "What do you call a sleeping bull? A bulldozer!",
    "Why did the coffee file a police report? It got mugged!",
    "What's the best thing about Switzerland? I don't know, but the flag is a big plus!",
];

pub const QUOTES: &[&str] = &[
    "Believe you can and you're halfway there. – Theodore Roosevelt",
    "Do one thing every day that scares you. – Eleanor Roosevelt",
    "Keep your face always toward the sunshine, and shadows will fall behind you. – Walt Whitman",
    "The only way to do great work is to love what you do. – Steve Jobs",
    "The best way out is always through. – Robert Frost",
];

/// Returns the command listing.
pub fn help() -> String {
    format!(
        "🤖 *WhatsApp Universal Bot Commands:*\n\n\
         Available commands:\n\
         • /help - Show this help message\n\
         • /ping - Check if bot is online\n\
         • /uptime - Show bot uptime\n\
         • /time - Get current time\n\
         • /joke - Get a random joke\n\
         • /quote - Get a motivational quote\n\
         • /info - Get bot information\n\
         • /echo [text] - Echo your message\n\
         • /whoami - Show your info\n\
         • /chatinfo - Show chat information\n\
         • /tagall - Tags all the group members\n\
         • /kick @user - Kick user(s) from group\n\
         • /promote @user - Promote user(s) to admin\n\
         • /roll - Roll a number 1-100\n\
         • /remindme <time> <msg> - Set a reminder\n\
         • /spam <count> <message> - Send a message up to {MAX_SPAM_COUNT} times\n\
         • /restart - Restart the bot (requires process manager)\n\
         • /shutdown - Shut down the bot\n\n\
         📍 This bot responds to EVERYONE's commands in any chat!"
    )
}

pub fn pong(kind: ChatKind, name: &str) -> String {
    format!("🏓 Pong! Bot is online and working in {kind}: {name}")
}

/// Formats elapsed time as whole hours, minutes and seconds.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours}h {minutes}m {seconds}s")
}

pub fn uptime(uptime: Duration) -> String {
    format!("⏱️ Bot uptime: {}", format_uptime(uptime))
}

pub fn time(now: DateTime<Local>) -> String {
    format!("🕐 Current time: {}", now.format("%Y-%m-%d %H:%M:%S"))
}

pub fn joke() -> String {
    let joke = JOKES.choose(&mut rand::thread_rng()).copied().unwrap_or_default();
    format!("😂 {joke}")
}

pub fn quote() -> String {
    let quote = QUOTES.choose(&mut rand::thread_rng()).copied().unwrap_or_default();
    format!("💡 Motivational Quote:\n\"{quote}\"")
}

/// Uniform roll in `1..=100`.
pub fn roll_value() -> u32 {
    rand::thread_rng().gen_range(1..=100)
}

pub fn roll(value: u32) -> String {
    format!("🎲 You rolled a {value}!")
}

pub fn info(uptime: Duration, bot_number: &str, kind: ChatKind, name: &str) -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        "🤖 *Bot Information:*\n\n\
         Name: {BOT_NAME}\n\
         Version: {version}\n\
         Status: Online ✅\n\
         Uptime: {} seconds\n\
         Bot Number: {bot_number}\n\
         Current Chat: {kind} - {name}\n\n\
         This bot responds to EVERYONE's commands in any chat!",
        uptime.as_secs()
    )
}

pub fn whoami(sender: &str, message_id: &str, kind: ChatKind, name: &str, chat_id: &str) -> String {
    format!(
        "👤 *Your Information:*\n\n\
         Your Number: {sender}\n\
         Your Message ID: {message_id}\n\
         Chat Type: {kind}\n\
         Chat Name: {name}\n\
         Chat ID: {chat_id}"
    )
}

pub fn chat_info(kind: ChatKind, name: &str, chat_id: &str, sender: &str, timestamp: i64) -> String {
    let sent_at = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map_or_else(|| "Unknown".to_owned(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());

    format!(
        "📊 *Chat Information:*\n\n\
         Chat Type: {kind}\n\
         Chat Name: {name}\n\
         Chat ID: {chat_id}\n\
         Your Number: {sender}\n\
         Message Timestamp: {sent_at}"
    )
}

pub fn echo(text: &str) -> String {
    format!("🔄 You said: {text}")
}

pub const TAG_ALL_HEADER: &str = "📣 *Tagging everyone:*\n\n";

pub const KICK_DONE: &str = "✅ User(s) kicked successfully.";

pub fn kick_failed(message: &str) -> String {
    format!("❌ Could not kick user(s): {message}")
}

pub const KICK_NOT_ADMIN: &str = "❌ I must be an admin to kick users.";
pub const KICK_USAGE: &str = "❗ Please mention a user to kick. Example: /kick @1234567890";

pub const PROMOTE_DONE: &str = "✅ User(s) promoted to admin successfully.";

pub fn promote_failed(message: &str) -> String {
    format!("❌ Could not promote user(s): {message}")
}

pub const PROMOTE_NOT_ADMIN: &str = "❌ I need to be admin to promote users.";
pub const PROMOTE_USAGE: &str =
    "❗ Please mention a user to promote. Example: /promote @1234567890";

pub fn reminder_set(time_token: &str, message: &str) -> String {
    format!("⏰ Reminder set for {time_token} from now: \"{message}\"")
}

pub fn reminder(message: &str) -> String {
    format!("⏰ Reminder: {message}")
}

pub fn spam_out_of_range() -> String {
    format!("❗ Count must be a number between 1 and {MAX_SPAM_COUNT} to prevent abuse.")
}

pub fn spam_started(message: &str, count: u32) -> String {
    format!("📨 Sending \"{message}\" {count} times...")
}

pub fn unknown(command: &str) -> String {
    format!("❌ Unknown command: {command}\nType /help to see available commands.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "0h 0m 59s");
        assert_eq!(format_uptime(Duration::from_secs(3725)), "1h 2m 5s");
        assert_eq!(format_uptime(Duration::from_millis(90_999)), "0h 1m 30s");
        assert_eq!(format_uptime(Duration::from_secs(100 * 3600)), "100h 0m 0s");
    }

    #[test]
    fn test_roll_in_range() {
        for _ in 0..1000 {
            let value = roll_value();
            assert!((1..=100).contains(&value));
        }
    }

    #[test]
    fn test_joke_from_list() {
        let text = joke();
        assert!(JOKES.iter().any(|j| text.ends_with(j)));
    }

    #[test]
    fn test_quote_from_list() {
        let text = quote();
        assert!(QUOTES.iter().any(|q| text.contains(q)));
    }

    #[test]
    fn test_unknown_names_command() {
        let text = unknown("/xyz");
        assert!(text.contains("/xyz"));
        assert!(text.contains("/help"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let text = help();
        for cmd in [
            "/help", "/ping", "/uptime", "/time", "/joke", "/quote", "/info", "/echo",
            "/whoami", "/chatinfo", "/tagall", "/kick", "/promote", "/roll", "/remindme",
            "/spam", "/restart", "/shutdown",
        ] {
            assert!(text.contains(cmd), "missing {cmd}");
        }
    }

    #[test]
    fn test_chat_info_invalid_timestamp() {
        let text = chat_info(ChatKind::Group, "Team", "1@g.us", "555@c.us", i64::MAX);
        assert!(text.contains("Message Timestamp: Unknown"));
    }
}
