//! Capability interface over the messaging session.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{ChatInfo, ContactInfo, SendOptions};

/// Errors reported by the messaging collaborator.
#[derive(Debug, Error)]
pub enum MessengerError {
    /// The bridge could not be reached.
    #[error("Bridge request failed: {0}")]
    Request(String),

    /// The bridge refused the operation; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid bridge response: {0}")]
    InvalidResponse(String),

    #[error("Event stream error: {0}")]
    Stream(String),
}

impl From<reqwest::Error> for MessengerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Operations the bot needs from a connected chat account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a text message to a chat.
    async fn send_message(
        &self,
        chat_id: &str,
        content: &str,
        options: SendOptions,
    ) -> Result<(), MessengerError>;

    /// Looks up a chat, including group participants.
    async fn get_chat(&self, chat_id: &str) -> Result<ChatInfo, MessengerError>;

    /// Looks up a contact.
    async fn get_contact(&self, contact_id: &str) -> Result<ContactInfo, MessengerError>;

    /// Removes participants from a group chat.
    async fn remove_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), MessengerError>;

    /// Grants admin rights to participants of a group chat.
    async fn promote_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), MessengerError>;
}
