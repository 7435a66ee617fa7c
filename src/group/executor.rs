//! Group membership actions gated on the bot's admin status.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::messaging::{BotIdentity, ChatInfo, Messenger, MessengerError};

/// Membership mutation requested by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    Kick,
    Promote,
}

impl fmt::Display for GroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kick => write!(f, "kick"),
            Self::Promote => write!(f, "promote"),
        }
    }
}

/// Reasons a group action was not carried out.
#[derive(Debug, Error)]
pub enum GroupActionError {
    #[error("chat is not a group")]
    NotAGroup,

    #[error("bot is not an admin of this group")]
    NotAdmin,

    #[error("no participants mentioned")]
    NoMentions,

    /// The messaging layer rejected the mutation.
    #[error("{action} failed: {message}")]
    Failed { action: GroupAction, message: String },

    /// A chat or contact lookup failed before any mutation was attempted.
    #[error("lookup failed: {0}")]
    Lookup(#[from] MessengerError),
}

/// Performs kick/promote on behalf of the command router.
pub struct GroupActionExecutor {
    messenger: Arc<dyn Messenger>,
}

impl GroupActionExecutor {
    /// Creates a new executor.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Applies `action` to the mentioned participants of `chat_id`.
    ///
    /// Preconditions are checked in order: the chat is a group, the bot is
    /// one of its admins, at least one participant is mentioned. No mutation
    /// is attempted unless all of them hold.
    pub async fn execute(
        &self,
        action: GroupAction,
        chat_id: &str,
        identity: Option<&BotIdentity>,
        mentioned: &[String],
    ) -> Result<(), GroupActionError> {
        let chat = self.messenger.get_chat(chat_id).await?;
        if !chat.is_group {
            return Err(GroupActionError::NotAGroup);
        }

        if !self.bot_is_admin(&chat, identity).await? {
            return Err(GroupActionError::NotAdmin);
        }

        if mentioned.is_empty() {
            return Err(GroupActionError::NoMentions);
        }

        let result = match action {
            GroupAction::Kick => self.messenger.remove_participants(chat_id, mentioned).await,
            GroupAction::Promote => self.messenger.promote_participants(chat_id, mentioned).await,
        };

        match result {
            Ok(()) => {
                info!("{} applied to {} participant(s) in {}", action, mentioned.len(), chat_id);
                Ok(())
            }
            Err(e) => {
                warn!("{} failed in {}: {}", action, chat_id, e);
                Err(GroupActionError::Failed {
                    action,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Checks the bot's own participant record for admin rights.
    async fn bot_is_admin(
        &self,
        chat: &ChatInfo,
        identity: Option<&BotIdentity>,
    ) -> Result<bool, MessengerError> {
        let Some(identity) = identity else {
            return Ok(false);
        };

        let contact = self.messenger.get_contact(&identity.self_chat_id()).await?;
        Ok(chat.participant(&contact.id).is_some_and(|p| p.is_admin))
    }
}

impl fmt::Debug for GroupActionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupActionExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{ContactInfo, MockMessenger, Participant};

    fn identity() -> BotIdentity {
        BotIdentity {
            wid: "100".to_owned(),
            pushname: None,
        }
    }

    fn group(bot_is_admin: bool) -> ChatInfo {
        ChatInfo {
            id: "1@g.us".to_owned(),
            name: Some("Team".to_owned()),
            is_group: true,
            participants: vec![
                Participant {
                    id: "100@c.us".to_owned(),
                    is_admin: bot_is_admin,
                },
                Participant {
                    id: "555@c.us".to_owned(),
                    is_admin: false,
                },
            ],
        }
    }

    fn mock_with(chat: ChatInfo) -> MockMessenger {
        let mut mock = MockMessenger::new();
        mock.expect_get_chat()
            .returning(move |_| Ok(chat.clone()));
        mock.expect_get_contact().returning(|id| {
            Ok(ContactInfo {
                id: id.to_owned(),
                number: id.trim_end_matches("@c.us").to_owned(),
                is_my_contact: false,
            })
        });
        mock
    }

    #[tokio::test]
    async fn test_kick_requires_admin() {
        let mut mock = mock_with(group(false));
        mock.expect_remove_participants().never();

        let executor = GroupActionExecutor::new(Arc::new(mock));
        let id = identity();
        let result = executor
            .execute(GroupAction::Kick, "1@g.us", Some(&id), &["555@c.us".to_owned()])
            .await;

        assert!(matches!(result, Err(GroupActionError::NotAdmin)));
    }

    #[tokio::test]
    async fn test_kick_rejects_non_group() {
        let mut chat = group(true);
        chat.is_group = false;
        let mut mock = mock_with(chat);
        mock.expect_remove_participants().never();

        let executor = GroupActionExecutor::new(Arc::new(mock));
        let id = identity();
        let result = executor
            .execute(GroupAction::Kick, "555@c.us", Some(&id), &["555@c.us".to_owned()])
            .await;

        assert!(matches!(result, Err(GroupActionError::NotAGroup)));
    }

    #[tokio::test]
    async fn test_promote_requires_mentions() {
        let mut mock = mock_with(group(true));
        mock.expect_promote_participants().never();

        let executor = GroupActionExecutor::new(Arc::new(mock));
        let id = identity();
        let result = executor
            .execute(GroupAction::Promote, "1@g.us", Some(&id), &[])
            .await;

        assert!(matches!(result, Err(GroupActionError::NoMentions)));
    }

    #[tokio::test]
    async fn test_not_admin_before_ready() {
        let mut mock = mock_with(group(true));
        mock.expect_remove_participants().never();

        let executor = GroupActionExecutor::new(Arc::new(mock));
        let result = executor
            .execute(GroupAction::Kick, "1@g.us", None, &["555@c.us".to_owned()])
            .await;

        assert!(matches!(result, Err(GroupActionError::NotAdmin)));
    }

    #[tokio::test]
    async fn test_kick_delegates_to_messenger() {
        let mut mock = mock_with(group(true));
        mock.expect_remove_participants()
            .withf(|chat, ids| chat == "1@g.us" && ids == ["555@c.us".to_owned()])
            .times(1)
            .returning(|_, _| Ok(()));

        let executor = GroupActionExecutor::new(Arc::new(mock));
        let id = identity();
        executor
            .execute(GroupAction::Kick, "1@g.us", Some(&id), &["555@c.us".to_owned()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_promote_failure_carries_message() {
        let mut mock = mock_with(group(true));
        mock.expect_promote_participants()
            .times(1)
            .returning(|_, _| Err(MessengerError::Rejected("participant not found".to_owned())));

        let executor = GroupActionExecutor::new(Arc::new(mock));
        let id = identity();
        let result = executor
            .execute(GroupAction::Promote, "1@g.us", Some(&id), &["999@c.us".to_owned()])
            .await;

        match result {
            Err(GroupActionError::Failed { action, message }) => {
                assert_eq!(action, GroupAction::Promote);
                assert_eq!(message, "participant not found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
