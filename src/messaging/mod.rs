//! Messaging session module.
//!
//! Defines the narrow capability interface the bot depends on and the
//! WhatsApp bridge client that implements it.

mod bridge;
mod messenger;
mod types;

pub use bridge::BridgeClient;
#[cfg(test)]
pub use messenger::MockMessenger;
pub use messenger::{Messenger, MessengerError};
pub use types::{
    BotIdentity, CONTACT_SUFFIX, ChatInfo, ChatKind, ContactInfo, GROUP_SUFFIX, InboundMessage,
    MessageKind, Participant, SendOptions, SessionEvent,
};
