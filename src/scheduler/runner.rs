//! Delayed and repeated sends.
//!
//! Reminders run as tokio tasks registered under a numeric id. A task sleeps
//! until its fire time, performs one send, then removes itself from the
//! registry. There is no retry: a failed reminder send is logged and dropped.
//! Bursts are not tasks at all; they run inline in the caller, one awaited
//! send after another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info};

use crate::config::MAX_REMINDER_DELAY;
use crate::messaging::{Messenger, MessengerError, SendOptions};

type TaskMap = HashMap<u64, JoinHandle<()>>;

/// A reminder waiting for its timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder {
    /// Registry id.
    pub id: u64,

    /// Chat the reminder will be sent to.
    pub chat_id: String,

    /// Delay requested at scheduling time.
    pub delay: Duration,

    /// Message text sent when the timer fires.
    pub text: String,

    /// When the reminder fires.
    pub fire_at: Instant,
}

/// Schedules one-shot reminders and sends bursts of messages.
pub struct SendScheduler {
    messenger: Arc<dyn Messenger>,
    tasks: Arc<Mutex<TaskMap>>,
    next_id: AtomicU64,
}

fn lock(tasks: &Mutex<TaskMap>) -> MutexGuard<'_, TaskMap> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SendScheduler {
    /// Creates a new scheduler sending through the given messenger.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self {
            messenger,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Sends `text` to `chat_id` once `delay` has elapsed.
    ///
    /// Returns immediately; the send happens on a background task. Delays
    /// longer than `MAX_REMINDER_DELAY` are clamped to it.
    pub fn schedule_once(&self, chat_id: &str, text: &str, delay: Duration) -> PendingReminder {
        let delay = delay.min(MAX_REMINDER_DELAY);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let reminder = PendingReminder {
            id,
            chat_id: chat_id.to_owned(),
            delay,
            text: text.to_owned(),
            fire_at: Instant::now() + delay,
        };

        let messenger = Arc::clone(&self.messenger);
        let tasks = Arc::clone(&self.tasks);
        let job = reminder.clone();

        // Hold the registry lock across spawn so the task cannot deregister
        // before it is registered.
        let mut registry = lock(&self.tasks);
        let handle = tokio::spawn(async move {
            sleep_until(job.fire_at).await;

            match messenger
                .send_message(&job.chat_id, &job.text, SendOptions::default())
                .await
            {
                Ok(()) => info!("Reminder {} delivered to {}", job.id, job.chat_id),
                Err(e) => error!("Failed to send reminder {}: {}", job.id, e),
            }

            lock(&tasks).remove(&job.id);
        });
        registry.insert(id, handle);
        drop(registry);

        debug!("Scheduled reminder {} for {:?} in {}", id, delay, chat_id);
        reminder
    }

    /// Sends `text` to `chat_id` `count` times, each send awaited before the
    /// next begins.
    ///
    /// Stops at the first failed send and returns its error.
    pub async fn send_burst(
        &self,
        chat_id: &str,
        text: &str,
        count: u32,
    ) -> Result<u32, MessengerError> {
        for sent in 0..count {
            if let Err(e) = self
                .messenger
                .send_message(chat_id, text, SendOptions::default())
                .await
            {
                error!("Burst to {} stopped after {} of {} sends", chat_id, sent, count);
                return Err(e);
            }
        }

        info!("Burst of {} messages sent to {}", count, chat_id);
        Ok(count)
    }

    /// Number of reminders that have not fired yet.
    pub fn pending(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// Aborts every outstanding reminder.
    pub fn shutdown(&self) {
        let mut tasks = lock(&self.tasks);
        if !tasks.is_empty() {
            info!("Dropping {} pending reminder(s)", tasks.len());
        }
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SendScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendScheduler")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::messaging::MockMessenger;

    #[tokio::test(start_paused = true)]
    async fn test_reminder_fires_after_delay() {
        let mut mock = MockMessenger::new();
        mock.expect_send_message()
            .withf(|chat, text, _| chat == "555@c.us" && text == "stretch")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let scheduler = SendScheduler::new(Arc::new(mock));
        let reminder = scheduler.schedule_once("555@c.us", "stretch", Duration::from_secs(2));
        assert_eq!(reminder.delay, Duration::from_secs(2));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_send_failure_is_swallowed() {
        let mut mock = MockMessenger::new();
        mock.expect_send_message()
            .times(1)
            .returning(|_, _, _| Err(MessengerError::Rejected("offline".to_owned())));

        let scheduler = SendScheduler::new(Arc::new(mock));
        scheduler.schedule_once("555@c.us", "later", Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_pending() {
        let mut mock = MockMessenger::new();
        mock.expect_send_message().never();

        let scheduler = SendScheduler::new(Arc::new(mock));
        scheduler.schedule_once("555@c.us", "never", Duration::from_secs(60));
        scheduler.schedule_once("555@c.us", "never", Duration::from_secs(120));
        assert_eq!(scheduler.pending(), 2);

        scheduler.shutdown();
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(300)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_delay_is_clamped() {
        let mut mock = MockMessenger::new();
        mock.expect_send_message().never();

        let scheduler = SendScheduler::new(Arc::new(mock));
        let reminder = scheduler.schedule_once("555@c.us", "far", Duration::from_secs(u64::MAX));

        assert_eq!(reminder.delay, MAX_REMINDER_DELAY);
        assert_eq!(scheduler.pending(), 1);
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_burst_sends_in_order() {
        let mut mock = MockMessenger::new();
        let mut seq = Sequence::new();
        for _ in 0..3 {
            mock.expect_send_message()
                .withf(|chat, text, options| {
                    chat == "1@g.us" && text == "hi" && options.mentions.is_empty()
                })
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _, _| Ok(()));
        }

        let scheduler = SendScheduler::new(Arc::new(mock));
        let sent = scheduler.send_burst("1@g.us", "hi", 3).await.unwrap();
        assert_eq!(sent, 3);
    }

    #[tokio::test]
    async fn test_burst_stops_on_first_failure() {
        let mut mock = MockMessenger::new();
        let mut calls = 0;
        mock.expect_send_message().times(2).returning(move |_, _, _| {
            calls += 1;
            if calls == 2 {
                Err(MessengerError::Rejected("rate limited".to_owned()))
            } else {
                Ok(())
            }
        });

        let scheduler = SendScheduler::new(Arc::new(mock));
        let result = scheduler.send_burst("1@g.us", "hi", 5).await;
        assert!(matches!(result, Err(MessengerError::Rejected(_))));
    }
}
