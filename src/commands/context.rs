//! Chat context resolution for command responses.

use tracing::debug;

use crate::messaging::{CONTACT_SUFFIX, ChatKind, Messenger};

/// Kind and display name of the chat a command arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    pub kind: ChatKind,
    pub name: String,
}

impl ChatContext {
    /// Resolves the chat kind from its identifier and its name through a
    /// chat lookup. Lookup failures fall back to a derived name.
    pub async fn resolve(messenger: &dyn Messenger, chat_id: &str) -> Self {
        let kind = ChatKind::from_chat_id(chat_id);

        let fallback = match kind {
            ChatKind::Group => "Unknown Group".to_owned(),
            ChatKind::Individual => chat_id.trim_end_matches(CONTACT_SUFFIX).to_owned(),
            ChatKind::Unknown => "Unknown".to_owned(),
        };

        let name = if kind == ChatKind::Unknown {
            fallback
        } else {
            match messenger.get_chat(chat_id).await {
                Ok(chat) => chat.name.filter(|n| !n.is_empty()).unwrap_or(fallback),
                Err(e) => {
                    debug!("Chat lookup for {} failed: {}", chat_id, e);
                    fallback
                }
            }
        };

        debug!("Chat Type: {} - {}", kind, name);

        Self { kind, name }
    }
}
