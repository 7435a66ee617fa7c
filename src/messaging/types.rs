//! Data types exchanged with the WhatsApp bridge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chat identifier suffix used for group chats.
pub const GROUP_SUFFIX: &str = "@g.us";

/// Chat identifier suffix used for individual contacts.
pub const CONTACT_SUFFIX: &str = "@c.us";

/// Content kind of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text.
    Chat,
    Image,
    Video,
    Audio,
    /// Voice note.
    Ptt,
    Document,
    Sticker,
    #[serde(other)]
    Other,
}

/// Kind of chat a message was sent in, derived from the chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Individual,
    Group,
    Unknown,
}

impl ChatKind {
    /// Classifies a chat identifier by its suffix.
    #[must_use]
    pub fn from_chat_id(chat_id: &str) -> Self {
        if chat_id.ends_with(GROUP_SUFFIX) {
            Self::Group
        } else if chat_id.ends_with(CONTACT_SUFFIX) {
            Self::Individual
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "Individual"),
            Self::Group => write!(f, "Group"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A message record as delivered by the bridge event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Serialized message identifier.
    pub id: String,

    /// Origin chat (the contact, or the group for group messages).
    pub from: String,

    /// Destination chat.
    pub to: String,

    /// Participant who wrote a group message.
    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub body: String,

    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Whether the bot account itself authored the message.
    #[serde(default)]
    pub from_me: bool,

    /// Unix timestamp in seconds.
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default)]
    pub mentioned_ids: Vec<String>,
}

impl InboundMessage {
    /// Returns the identifier of the person who wrote the message.
    #[must_use]
    pub fn sender(&self) -> &str {
        self.author.as_deref().unwrap_or(&self.from)
    }

    /// Returns the conversation replies should go to.
    #[must_use]
    pub fn chat_id(&self) -> &str {
        if self.from_me { &self.to } else { &self.from }
    }

    /// Checks if this is a plain text message.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Chat
    }
}

/// A participant entry of a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Result of a chat lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl ChatInfo {
    /// Finds a participant by identifier.
    #[must_use]
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }
}

/// Result of a contact lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub id: String,
    /// Phone number without the chat suffix.
    pub number: String,
    #[serde(default)]
    pub is_my_contact: bool,
}

/// Extra options for an outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Participant identifiers rendered as `@user` mentions.
    pub mentions: Vec<String>,
}

impl SendOptions {
    /// Creates options that mention the given participants.
    #[must_use]
    pub fn with_mentions(mentions: Vec<String>) -> Self {
        Self { mentions }
    }
}

/// Identity of the connected bot account, known once the session is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    /// The account's user part (phone number).
    pub wid: String,
    #[serde(default)]
    pub pushname: Option<String>,
}

impl BotIdentity {
    /// Returns the chat identifier of the bot's own chat.
    #[must_use]
    pub fn self_chat_id(&self) -> String {
        format!("{}{CONTACT_SUFFIX}", self.wid)
    }
}

/// Lifecycle and message events emitted by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A pairing code to display as a QR code.
    Qr { code: String },
    Authenticated,
    Ready(BotIdentity),
    Message(InboundMessage),
    Disconnected {
        #[serde(default)]
        reason: String,
    },
    AuthFailure {
        #[serde(default)]
        message: String,
    },
}
