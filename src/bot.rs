//! Session event handling: pairing, readiness, greetings and command dispatch.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::commands::{CommandRouter, templates};
use crate::messaging::{InboundMessage, Messenger, MessengerError, SendOptions, SessionEvent};
use crate::pairing;
use crate::session::BotSession;

/// Reacts to everything the messaging session emits.
pub struct Bot {
    messenger: Arc<dyn Messenger>,
    session: Arc<BotSession>,
    router: CommandRouter,
}

impl Bot {
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, session: Arc<BotSession>, router: CommandRouter) -> Self {
        Self {
            messenger,
            session,
            router,
        }
    }

    pub fn session(&self) -> &BotSession {
        &self.session
    }

    /// Handles one session event.
    pub async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Qr { code } => pairing::show(&code),
            SessionEvent::Authenticated => info!("WhatsApp Web authenticated"),
            SessionEvent::Ready(identity) => {
                let self_chat = identity.self_chat_id();
                self.session.set_identity(identity).await;
                info!("WhatsApp Bot is ready!");

                if let Err(e) = self
                    .messenger
                    .send_message(&self_chat, templates::STARTUP_NOTICE, SendOptions::default())
                    .await
                {
                    warn!("Could not send startup notice: {}", e);
                }
            }
            SessionEvent::Message(message) => self.on_message(&message).await,
            SessionEvent::Disconnected { reason } => warn!("WhatsApp disconnected: {}", reason),
            SessionEvent::AuthFailure { message } => error!("Authentication failed: {}", message),
        }
    }

    /// Greets first-time unknown senders, then routes commands.
    pub async fn on_message(&self, message: &InboundMessage) {
        debug!(
            "Message from {} in {}: {:?}",
            message.sender(),
            message.chat_id(),
            message.body
        );

        self.greet_if_needed(message).await;
        self.router.route(message).await;
    }

    async fn greet_if_needed(&self, message: &InboundMessage) {
        if message.from_me || !message.is_text() || message.body.trim().is_empty() {
            return;
        }

        let sender = message.sender();
        if let Err(e) = self.greet(sender).await {
            error!("Error sending greeting to {}: {}", sender, e);
        }
    }

    /// Sends the away-message at most once per sender for the process lifetime.
    ///
    /// A failed send releases the claim so a later message may retry.
    async fn greet(&self, sender: &str) -> Result<(), MessengerError> {
        let greetings = self.session.greetings();
        if greetings.is_greeted(sender) {
            return Ok(());
        }

        let contact = self.messenger.get_contact(sender).await?;

        let Some(claim) = greetings.try_claim(sender, contact.is_my_contact) else {
            return Ok(());
        };

        self.messenger
            .send_message(sender, templates::AWAY_MESSAGE, SendOptions::default())
            .await?;
        claim.confirm();

        info!("Greeted {}", sender);
        Ok(())
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
