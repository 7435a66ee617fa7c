//! Process-wide bot session context.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use super::GreetingTracker;
use crate::messaging::BotIdentity;

/// State that lives from process start to process exit.
///
/// Constructed once at startup and shared by the router, the greeting
/// flow and the scheduler.
#[derive(Debug)]
pub struct BotSession {
    /// When the process started.
    started_at: Instant,

    /// Own account identity, set once the messaging session is ready.
    identity: RwLock<Option<BotIdentity>>,

    /// Senders that already received the away-message.
    greetings: GreetingTracker,
}

impl Default for BotSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BotSession {
    /// Creates a session starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            identity: RwLock::new(None),
            greetings: GreetingTracker::new(),
        }
    }

    /// Time elapsed since the session was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores the bot identity reported by the messaging session.
    pub async fn set_identity(&self, identity: BotIdentity) {
        info!(
            "Connected as: {} ({})",
            identity.pushname.as_deref().unwrap_or("unknown"),
            identity.wid
        );
        *self.identity.write().await = Some(identity);
    }

    /// Returns the bot identity if the session is ready.
    pub async fn identity(&self) -> Option<BotIdentity> {
        self.identity.read().await.clone()
    }

    /// Returns the bot's phone number, or an empty string before ready.
    pub async fn bot_number(&self) -> String {
        self.identity
            .read()
            .await
            .as_ref()
            .map(|i| i.wid.clone())
            .unwrap_or_default()
    }

    pub fn greetings(&self) -> &GreetingTracker {
        &self.greetings
    }
}
