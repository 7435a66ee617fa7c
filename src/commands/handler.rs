//! Command router implementation.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, info, warn};

use super::args::{ReminderParseError, ReminderRequest, SpamParseError, SpamRequest};
use super::context::ChatContext;
use super::templates;
use super::types::{BotCommand, CommandResult};
use crate::group::{GroupAction, GroupActionError, GroupActionExecutor};
use crate::messaging::{InboundMessage, Messenger, MessengerError, SendOptions};
use crate::scheduler::SendScheduler;
use crate::session::BotSession;
use crate::shutdown::{ShutdownReason, ShutdownRequester};

/// Maps inbound commands to handlers and sends their responses.
pub struct CommandRouter {
    messenger: Arc<dyn Messenger>,
    session: Arc<BotSession>,
    scheduler: Arc<SendScheduler>,
    groups: GroupActionExecutor,
    shutdown: ShutdownRequester,
}

impl CommandRouter {
    /// Creates a new command router.
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        session: Arc<BotSession>,
        scheduler: Arc<SendScheduler>,
        shutdown: ShutdownRequester,
    ) -> Self {
        Self {
            groups: GroupActionExecutor::new(Arc::clone(&messenger)),
            messenger,
            session,
            scheduler,
            shutdown,
        }
    }

    /// Dispatches a message if it is a command.
    ///
    /// Self-authored and non-text messages are ignored. Failures are logged
    /// and answered with an apology; they never propagate to the caller.
    pub async fn route(&self, message: &InboundMessage) {
        if message.from_me || !message.is_text() {
            return;
        }

        let Some(command) = BotCommand::parse(&message.body) else {
            return;
        };

        let chat_id = message.chat_id();
        debug!("Handling command from {}: {}", message.sender(), command);

        if let Err(e) = self.dispatch(message, command).await {
            error!("Error processing message in {}: {}", chat_id, e);
            self.apologize(chat_id).await;
        }
    }

    async fn dispatch(
        &self,
        message: &InboundMessage,
        command: BotCommand,
    ) -> Result<(), MessengerError> {
        let name = command.name();
        let result = self.execute(message, command).await?;
        if result.success {
            debug!("Command /{} succeeded", name);
        } else {
            warn!("Command /{} rejected in {}", name, message.chat_id());
        }

        if let Some(text) = result.message {
            self.send(message.chat_id(), &text).await?;
            info!("Response sent to {}", message.chat_id());
        }

        Ok(())
    }

    /// Executes a parsed command.
    async fn execute(
        &self,
        message: &InboundMessage,
        command: BotCommand,
    ) -> Result<CommandResult, MessengerError> {
        let chat_id = message.chat_id();

        let result = match command {
            BotCommand::Help => CommandResult::success(templates::help()),
            BotCommand::Ping => {
                let ctx = self.context(chat_id).await;
                CommandResult::success(templates::pong(ctx.kind, &ctx.name))
            }
            BotCommand::Uptime => CommandResult::success(templates::uptime(self.session.uptime())),
            BotCommand::Time => CommandResult::success(templates::time(Local::now())),
            BotCommand::Joke => CommandResult::success(templates::joke()),
            BotCommand::Quote => CommandResult::success(templates::quote()),
            BotCommand::Info => self.handle_info(chat_id).await,
            BotCommand::WhoAmI => {
                let ctx = self.context(chat_id).await;
                CommandResult::success(templates::whoami(
                    message.sender(),
                    &message.id,
                    ctx.kind,
                    &ctx.name,
                    chat_id,
                ))
            }
            BotCommand::ChatInfo => {
                let ctx = self.context(chat_id).await;
                CommandResult::success(templates::chat_info(
                    ctx.kind,
                    &ctx.name,
                    chat_id,
                    message.sender(),
                    message.timestamp,
                ))
            }
            BotCommand::Echo(text) => CommandResult::success(templates::echo(&text)),
            BotCommand::Roll => CommandResult::success(templates::roll(templates::roll_value())),
            BotCommand::Restart => {
                self.handle_stop(chat_id, ShutdownReason::Restart, templates::RESTARTING)
                    .await?
            }
            BotCommand::Shutdown => {
                self.handle_stop(chat_id, ShutdownReason::Shutdown, templates::SHUTTING_DOWN)
                    .await?
            }
            BotCommand::TagAll => self.handle_tag_all(chat_id).await?,
            BotCommand::Kick => self.handle_group_action(GroupAction::Kick, message).await?,
            BotCommand::Promote => self.handle_group_action(GroupAction::Promote, message).await?,
            BotCommand::RemindMe(args) => self.handle_remindme(chat_id, &args).await?,
            BotCommand::Spam(args) => self.handle_spam(chat_id, &args).await?,
            BotCommand::Unknown(text) => CommandResult::error(templates::unknown(&text)),
        };

        Ok(result)
    }

    async fn context(&self, chat_id: &str) -> ChatContext {
        ChatContext::resolve(self.messenger.as_ref(), chat_id).await
    }

    async fn handle_info(&self, chat_id: &str) -> CommandResult {
        let ctx = self.context(chat_id).await;
        let bot_number = self.session.bot_number().await;

        CommandResult::success(templates::info(
            self.session.uptime(),
            &bot_number,
            ctx.kind,
            &ctx.name,
        ))
    }

    async fn handle_stop(
        &self,
        chat_id: &str,
        reason: ShutdownReason,
        notice: &str,
    ) -> Result<CommandResult, MessengerError> {
        self.send(chat_id, notice).await?;
        info!("{} received, shutting down...", reason);
        self.shutdown.request_after_delay(reason);
        Ok(CommandResult::handled())
    }

    async fn handle_tag_all(&self, chat_id: &str) -> Result<CommandResult, MessengerError> {
        let chat = self.messenger.get_chat(chat_id).await?;
        if !chat.is_group {
            return Ok(CommandResult::error(templates::GROUP_ONLY));
        }

        let mut text = templates::TAG_ALL_HEADER.to_owned();
        let mut mentions = Vec::with_capacity(chat.participants.len());

        for participant in &chat.participants {
            let contact = self.messenger.get_contact(&participant.id).await?;
            text.push('@');
            text.push_str(&contact.number);
            text.push(' ');
            mentions.push(participant.id.clone());
        }

        self.messenger
            .send_message(chat_id, text.trim_end(), SendOptions::with_mentions(mentions))
            .await?;
        info!("Tagall message sent to {}", chat_id);

        Ok(CommandResult::handled())
    }

    async fn handle_group_action(
        &self,
        action: GroupAction,
        message: &InboundMessage,
    ) -> Result<CommandResult, MessengerError> {
        let identity = self.session.identity().await;
        let outcome = self
            .groups
            .execute(action, message.chat_id(), identity.as_ref(), &message.mentioned_ids)
            .await;

        let result = match (action, outcome) {
            (GroupAction::Kick, Ok(())) => CommandResult::success(templates::KICK_DONE),
            (GroupAction::Promote, Ok(())) => CommandResult::success(templates::PROMOTE_DONE),
            (_, Err(GroupActionError::NotAGroup)) => CommandResult::error(templates::GROUP_ONLY),
            (GroupAction::Kick, Err(GroupActionError::NotAdmin)) => {
                CommandResult::error(templates::KICK_NOT_ADMIN)
            }
            (GroupAction::Promote, Err(GroupActionError::NotAdmin)) => {
                CommandResult::error(templates::PROMOTE_NOT_ADMIN)
            }
            (GroupAction::Kick, Err(GroupActionError::NoMentions)) => {
                CommandResult::error(templates::KICK_USAGE)
            }
            (GroupAction::Promote, Err(GroupActionError::NoMentions)) => {
                CommandResult::error(templates::PROMOTE_USAGE)
            }
            (GroupAction::Kick, Err(GroupActionError::Failed { message, .. })) => {
                CommandResult::error(templates::kick_failed(&message))
            }
            (GroupAction::Promote, Err(GroupActionError::Failed { message, .. })) => {
                CommandResult::error(templates::promote_failed(&message))
            }
            (_, Err(GroupActionError::Lookup(e))) => return Err(e),
        };

        Ok(result)
    }

    async fn handle_remindme(
        &self,
        chat_id: &str,
        args: &str,
    ) -> Result<CommandResult, MessengerError> {
        let request = match ReminderRequest::parse(args) {
            Ok(request) => request,
            Err(ReminderParseError::Usage) => {
                return Ok(CommandResult::error(templates::REMINDME_USAGE));
            }
            Err(ReminderParseError::InvalidTime(_)) => {
                return Ok(CommandResult::error(templates::REMINDME_BAD_TIME));
            }
        };

        self.send(
            chat_id,
            &templates::reminder_set(&request.time_token, &request.message),
        )
        .await?;

        self.scheduler.schedule_once(
            chat_id,
            &templates::reminder(&request.message),
            request.delay,
        );

        Ok(CommandResult::handled())
    }

    async fn handle_spam(&self, chat_id: &str, args: &str) -> Result<CommandResult, MessengerError> {
        let request = match SpamRequest::parse(args) {
            Ok(request) => request,
            Err(SpamParseError::Usage) => return Ok(CommandResult::error(templates::SPAM_USAGE)),
            Err(SpamParseError::CountOutOfRange(_)) => {
                return Ok(CommandResult::error(templates::spam_out_of_range()));
            }
        };

        self.send(
            chat_id,
            &templates::spam_started(&request.message, request.count),
        )
        .await?;

        self.scheduler
            .send_burst(chat_id, &request.message, request.count)
            .await?;

        Ok(CommandResult::handled())
    }

    async fn send(&self, chat_id: &str, text: &str) -> Result<(), MessengerError> {
        self.messenger
            .send_message(chat_id, text, SendOptions::default())
            .await
    }

    async fn apologize(&self, chat_id: &str) {
        match self.send(chat_id, templates::APOLOGY).await {
            Ok(()) => info!("Error message sent to {}", chat_id),
            Err(e) => error!("Failed to send error message to {}: {}", chat_id, e),
        }
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::Sequence;

    use super::*;
    use crate::messaging::{BotIdentity, ChatInfo, ContactInfo, MessageKind, MockMessenger, Participant};

    fn message(body: &str) -> InboundMessage {
        InboundMessage {
            id: "false_1@g.us_ABC".to_owned(),
            from: "1@g.us".to_owned(),
            to: "100@c.us".to_owned(),
            author: Some("555@c.us".to_owned()),
            body: body.to_owned(),
            kind: MessageKind::Chat,
            from_me: false,
            timestamp: 1_700_000_000,
            mentioned_ids: Vec::new(),
        }
    }

    fn group_chat(bot_is_admin: bool) -> ChatInfo {
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

    fn router(mock: MockMessenger) -> (CommandRouter, tokio::sync::mpsc::Receiver<ShutdownReason>) {
        let messenger: Arc<dyn Messenger> = Arc::new(mock);
        let (shutdown, rx) = ShutdownRequester::new(Duration::from_secs(1));
        let router = CommandRouter::new(
            Arc::clone(&messenger),
            Arc::new(BotSession::new()),
            Arc::new(SendScheduler::new(messenger)),
            shutdown,
        );
        (router, rx)
    }

    fn expect_reply(mock: &mut MockMessenger, check: impl Fn(&str) -> bool + Send + 'static) {
        mock.expect_send_message()
            .withf(move |chat, text, _| chat == "1@g.us" && check(text))
            .times(1)
            .returning(|_, _, _| Ok(()));
    }

    #[tokio::test]
    async fn test_echo_preserves_case() {
        let mut mock = MockMessenger::new();
        expect_reply(&mut mock, |text| text.ends_with("Hello World"));

        let (router, _rx) = router(mock);
        router.route(&message("/echo Hello World")).await;
    }

    #[tokio::test]
    async fn test_execute_flags_rejections() {
        let mut mock = MockMessenger::new();
        mock.expect_get_chat().returning(|id| {
            Ok(ChatInfo {
                id: id.to_owned(),
                name: None,
                is_group: false,
                participants: Vec::new(),
            })
        });
        let (router, _rx) = router(mock);
        let msg = message("/echo hi");

        let echoed = router.execute(&msg, BotCommand::Echo("hi".to_owned())).await.unwrap();
        assert!(echoed.success);

        let unknown = router.execute(&msg, BotCommand::Unknown("/xyz".to_owned())).await.unwrap();
        assert!(!unknown.success);

        let usage = router.execute(&msg, BotCommand::Spam(String::new())).await.unwrap();
        assert!(!usage.success);
        assert_eq!(usage.message.as_deref(), Some(templates::SPAM_USAGE));

        let tagall = router.execute(&msg, BotCommand::TagAll).await.unwrap();
        assert!(!tagall.success);
        assert_eq!(tagall.message.as_deref(), Some(templates::GROUP_ONLY));
    }

    #[tokio::test]
    async fn test_ignores_self_authored_and_non_text() {
        let mut mock = MockMessenger::new();
        mock.expect_send_message().never();
        let (router, _rx) = router(mock);

        let mut own = message("/ping");
        own.from_me = true;
        router.route(&own).await;

        let mut image = message("/ping");
        image.kind = MessageKind::Image;
        router.route(&image).await;

        router.route(&message("just chatting")).await;
    }

    #[tokio::test]
    async fn test_unknown_command_points_to_help() {
        let mut mock = MockMessenger::new();
        expect_reply(&mut mock, |text| text.contains("/xyz") && text.contains("/help"));

        let (router, _rx) = router(mock);
        router.route(&message("/xyz")).await;
    }

    #[tokio::test]
    async fn test_ping_names_chat() {
        let mut mock = MockMessenger::new();
        mock.expect_get_chat().returning(|_| Ok(group_chat(false)));
        expect_reply(&mut mock, |text| text.contains("Group: Team"));

        let (router, _rx) = router(mock);
        router.route(&message("/ping")).await;
    }

    #[tokio::test]
    async fn test_kick_without_admin_reports_permission_error() {
        let mut mock = MockMessenger::new();
        mock.expect_get_chat().returning(|_| Ok(group_chat(false)));
        mock.expect_get_contact().returning(|id| {
            Ok(ContactInfo {
                id: id.to_owned(),
                number: "100".to_owned(),
                is_my_contact: false,
            })
        });
        mock.expect_remove_participants().never();
        expect_reply(&mut mock, |text| text == templates::KICK_NOT_ADMIN);

        let (router, _rx) = router(mock);
        router
            .session
            .set_identity(BotIdentity {
                wid: "100".to_owned(),
                pushname: None,
            })
            .await;

        let mut msg = message("/kick @555");
        msg.mentioned_ids = vec!["555@c.us".to_owned()];
        router.route(&msg).await;
    }

    #[tokio::test]
    async fn test_tagall_mentions_every_participant() {
        let mut mock = MockMessenger::new();
        mock.expect_get_chat().returning(|_| Ok(group_chat(false)));
        mock.expect_get_contact().returning(|id| {
            Ok(ContactInfo {
                id: id.to_owned(),
                number: id.trim_end_matches("@c.us").to_owned(),
                is_my_contact: true,
            })
        });
        mock.expect_send_message()
            .withf(|chat, text, options| {
                chat == "1@g.us"
                    && text.contains("@100 @555")
                    && options.mentions == ["100@c.us".to_owned(), "555@c.us".to_owned()]
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (router, _rx) = router(mock);
        router.route(&message("/tagall")).await;
    }

    #[tokio::test]
    async fn test_tagall_outside_group_warns() {
        let mut mock = MockMessenger::new();
        mock.expect_get_chat().returning(|id| {
            Ok(ChatInfo {
                id: id.to_owned(),
                name: None,
                is_group: false,
                participants: Vec::new(),
            })
        });
        expect_reply(&mut mock, |text| text == templates::GROUP_ONLY);

        let (router, _rx) = router(mock);
        router.route(&message("/tagall")).await;
    }

    #[tokio::test]
    async fn test_spam_out_of_range_sends_nothing_else() {
        let mut mock = MockMessenger::new();
        expect_reply(&mut mock, |text| text.starts_with("❗ Count must be"));

        let (router, _rx) = router(mock);
        router.route(&message("/spam 11 hi")).await;
    }

    #[tokio::test]
    async fn test_spam_acknowledges_then_bursts() {
        let mut mock = MockMessenger::new();
        let mut seq = Sequence::new();
        mock.expect_send_message()
            .withf(|_, text, _| text.starts_with("📨"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        mock.expect_send_message()
            .withf(|_, text, _| text == "hi")
            .times(3)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let (router, _rx) = router(mock);
        router.route(&message("/spam 3 hi")).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_remindme_bad_time_creates_no_timer() {
        let mut mock = MockMessenger::new();
        expect_reply(&mut mock, |text| text == templates::REMINDME_BAD_TIME);

        let (router, _rx) = router(mock);
        router.route(&message("/remindme 5x stretch")).await;
        assert_eq!(router.scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remindme_huge_delay_is_rejected() {
        let mut mock = MockMessenger::new();
        expect_reply(&mut mock, |text| text == templates::REMINDME_BAD_TIME);

        let (router, _rx) = router(mock);
        router.route(&message("/remindme 10000000000000000000s hi")).await;
        assert_eq!(router.scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remindme_schedules_once() {
        let mut mock = MockMessenger::new();
        let mut seq = Sequence::new();
        mock.expect_send_message()
            .withf(|_, text, _| text.starts_with("⏰ Reminder set for 2s"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        mock.expect_send_message()
            .withf(|_, text, _| text == "⏰ Reminder: ping")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let (router, _rx) = router(mock);
        router.route(&message("/remindme 2s ping")).await;
        assert_eq!(router.scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(router.scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_acknowledges_then_requests_exit() {
        let mut mock = MockMessenger::new();
        expect_reply(&mut mock, |text| text == templates::SHUTTING_DOWN);

        let (router, mut rx) = router(mock);
        router.route(&message("/shutdown")).await;

        assert_eq!(rx.recv().await, Some(ShutdownReason::Shutdown));
    }

    #[tokio::test]
    async fn test_send_failure_triggers_apology() {
        let mut mock = MockMessenger::new();
        let mut seq = Sequence::new();
        mock.expect_send_message()
            .withf(|_, text, _| text.starts_with("🔄"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(MessengerError::Rejected("boom".to_owned())));
        mock.expect_send_message()
            .withf(|_, text, _| text == templates::APOLOGY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let (router, _rx) = router(mock);
        router.route(&message("/echo hi")).await;
    }
}
