use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use wither::bson::oid::ObjectId;

use crate::core::channels::{ChannelSender, Recipient, SendOutcome};
use crate::enums::{NotificationChannel, NotificationKind, NotificationPriority};
use crate::errors::Error;
use crate::models::accounts::Account;
use crate::models::notifications::{Notification, NotificationReference};
use crate::utils::models::ModelExt;

/// Priority-to-channel escalation. The default is strictly nested: every
/// channel attempted for a tier is also attempted for all tiers above it.
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    channels: HashMap<NotificationPriority, Vec<NotificationChannel>>,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        use NotificationChannel::*;
        use NotificationPriority::*;

        let mut channels = HashMap::new();
        channels.insert(Low, vec![Realtime]);
        channels.insert(Medium, vec![Realtime, Push]);
        channels.insert(High, vec![Realtime, Push, Email]);
        channels.insert(Critical, vec![Realtime, Push, Whatsapp, Email]);

        Self { channels }
    }
}

impl DeliveryPolicy {
    pub fn channels_for(&self, priority: NotificationPriority) -> &[NotificationChannel] {
        self.channels
            .get(&priority)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Producer-facing dispatch input. Kind and priority arrive already typed;
/// serde rejects unknown variants before this struct exists.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub user_id: String,
    pub kind: NotificationKind,
    pub body: String,
    pub priority: NotificationPriority,
    pub reference: Option<NotificationReference>,
    pub metadata: Option<HashMap<String, String>>,
    pub group_key: Option<String>,
}

/// Persists the notification, then fans out delivery in a background task.
/// The caller gets the stored record back as soon as the write commits;
/// channel failures stay inside the task.
pub struct DeliveryCoordinator {
    policy: DeliveryPolicy,
    senders: Vec<Arc<dyn ChannelSender>>,
    channel_timeout: Duration,
}

impl DeliveryCoordinator {
    pub fn new(
        policy: DeliveryPolicy,
        senders: Vec<Arc<dyn ChannelSender>>,
        channel_timeout: Duration,
    ) -> Self {
        Self {
            policy,
            senders,
            channel_timeout,
        }
    }

    pub async fn dispatch(&self, request: DispatchRequest) -> Result<Notification, Error> {
        if request.user_id.trim().is_empty() {
            return Err(Error::bad_request("Notification recipient is required"));
        }

        let notification = Notification::create(Notification::new(
            request.user_id.clone(),
            request.kind,
            request.body,
            request.priority,
            request.reference,
            request.metadata,
            request.group_key,
        ))
        .await?;

        let channels = self.policy.channels_for(request.priority).to_vec();
        let senders = self.senders.clone();
        let timeout = self.channel_timeout;
        let spawned = notification.clone();

        tokio::spawn(async move {
            let recipient = match Account::get_by_user_id(&spawned.user_id).await {
                Ok(Some(account)) => Recipient::from_account(account),
                Ok(None) => {
                    tracing::warn!(
                        "No account found for notification recipient {}, contact channels will skip",
                        spawned.user_id
                    );
                    Recipient::bare(&spawned.user_id)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to load account for recipient {}: {e}, contact channels will skip",
                        spawned.user_id
                    );
                    Recipient::bare(&spawned.user_id)
                }
            };

            let outcomes = run_fanout(&senders, &channels, &recipient, &spawned, timeout).await;
            record_outcomes(spawned.id, &outcomes).await;
        });

        Ok(notification)
    }
}

/// Runs every applicable sender concurrently, each bounded by the timeout.
/// A timed-out send counts as failed; nothing is retried here.
pub async fn run_fanout(
    senders: &[Arc<dyn ChannelSender>],
    channels: &[NotificationChannel],
    recipient: &Recipient,
    notification: &Notification,
    timeout: Duration,
) -> Vec<(NotificationChannel, SendOutcome)> {
    let attempts = senders
        .iter()
        .filter(|sender| channels.contains(&sender.channel()))
        .map(|sender| async move {
            let channel = sender.channel();
            let outcome = match tokio::time::timeout(timeout, sender.send(recipient, notification))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => SendOutcome::Failed(format!("send timed out after {timeout:?}")),
            };
            (channel, outcome)
        });

    join_all(attempts).await
}

pub fn delivered_channels(
    outcomes: &[(NotificationChannel, SendOutcome)],
) -> Vec<NotificationChannel> {
    outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == SendOutcome::Delivered)
        .map(|(channel, _)| *channel)
        .collect()
}

async fn record_outcomes(
    notification_id: Option<ObjectId>,
    outcomes: &[(NotificationChannel, SendOutcome)],
) {
    for (channel, outcome) in outcomes {
        match outcome {
            SendOutcome::Delivered => {
                tracing::debug!("Channel {channel} delivered notification {notification_id:?}");
            }
            SendOutcome::Skipped => {
                tracing::debug!("Channel {channel} skipped notification {notification_id:?}");
            }
            SendOutcome::Failed(reason) => {
                tracing::error!(
                    "Channel {channel} failed for notification {notification_id:?}: {reason}"
                );
            }
        }
    }

    let delivered = delivered_channels(outcomes);
    let Some(id) = notification_id else {
        return;
    };

    if let Err(e) = Notification::mark_channels_delivered(&id, &delivered).await {
        tracing::error!("Failed to persist delivery flags for notification {id}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct MockSender {
        channel: NotificationChannel,
        outcome: SendOutcome,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MockSender {
        fn new(channel: NotificationChannel, outcome: SendOutcome) -> Arc<Self> {
            Arc::new(Self {
                channel,
                outcome,
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(channel: NotificationChannel, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                channel,
                outcome: SendOutcome::Delivered,
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChannelSender for MockSender {
        fn channel(&self) -> NotificationChannel {
            self.channel
        }

        async fn send(&self, _recipient: &Recipient, _notification: &Notification) -> SendOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }

    fn sample_notification() -> Notification {
        Notification::new(
            "u1".to_string(),
            NotificationKind::Task,
            "Nueva tarea publicada".to_string(),
            NotificationPriority::Medium,
            None,
            None,
            None,
        )
    }

    fn all_senders() -> (
        Arc<MockSender>,
        Arc<MockSender>,
        Arc<MockSender>,
        Arc<MockSender>,
    ) {
        (
            MockSender::new(NotificationChannel::Realtime, SendOutcome::Delivered),
            MockSender::new(NotificationChannel::Push, SendOutcome::Delivered),
            MockSender::new(NotificationChannel::Whatsapp, SendOutcome::Delivered),
            MockSender::new(NotificationChannel::Email, SendOutcome::Delivered),
        )
    }

    #[test]
    fn default_policy_is_strictly_nested() {
        let policy = DeliveryPolicy::default();

        let low = policy.channels_for(NotificationPriority::Low);
        let medium = policy.channels_for(NotificationPriority::Medium);
        let high = policy.channels_for(NotificationPriority::High);
        let critical = policy.channels_for(NotificationPriority::Critical);

        assert_eq!(low, [NotificationChannel::Realtime]);
        assert!(low.iter().all(|c| medium.contains(c)));
        assert!(medium.iter().all(|c| high.contains(c)));
        assert!(high.iter().all(|c| critical.contains(c)));
        assert_eq!(critical.len(), 4);

        assert!(!low.contains(&NotificationChannel::Email));
        assert!(!medium.contains(&NotificationChannel::Email));
        assert!(!high.contains(&NotificationChannel::Whatsapp));
    }

    #[tokio::test]
    async fn low_priority_invokes_only_realtime() {
        let (realtime, push, whatsapp, email) = all_senders();
        let senders: Vec<Arc<dyn ChannelSender>> = vec![
            realtime.clone(),
            push.clone(),
            whatsapp.clone(),
            email.clone(),
        ];

        let policy = DeliveryPolicy::default();
        let outcomes = run_fanout(
            &senders,
            policy.channels_for(NotificationPriority::Low),
            &Recipient::bare("u1"),
            &sample_notification(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(realtime.call_count(), 1);
        assert_eq!(push.call_count(), 0);
        assert_eq!(whatsapp.call_count(), 0);
        assert_eq!(email.call_count(), 0);
    }

    #[tokio::test]
    async fn one_channel_failure_does_not_stop_the_others() {
        let realtime = MockSender::new(NotificationChannel::Realtime, SendOutcome::Delivered);
        let push = MockSender::new(NotificationChannel::Push, SendOutcome::Delivered);
        let whatsapp = MockSender::new(NotificationChannel::Whatsapp, SendOutcome::Skipped);
        let email = MockSender::new(
            NotificationChannel::Email,
            SendOutcome::Failed("smtp relay down".to_string()),
        );
        let senders: Vec<Arc<dyn ChannelSender>> = vec![
            realtime.clone(),
            push.clone(),
            whatsapp.clone(),
            email.clone(),
        ];

        let policy = DeliveryPolicy::default();
        let outcomes = run_fanout(
            &senders,
            policy.channels_for(NotificationPriority::Critical),
            &Recipient::bare("u1"),
            &sample_notification(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(email.call_count(), 1);

        let delivered = delivered_channels(&outcomes);
        assert!(delivered.contains(&NotificationChannel::Realtime));
        assert!(delivered.contains(&NotificationChannel::Push));
        assert!(!delivered.contains(&NotificationChannel::Whatsapp));
        assert!(!delivered.contains(&NotificationChannel::Email));
    }

    #[tokio::test]
    async fn slow_sender_times_out_as_failed() {
        let slow = MockSender::slow(NotificationChannel::Email, Duration::from_millis(200));
        let fast = MockSender::new(NotificationChannel::Realtime, SendOutcome::Delivered);
        let senders: Vec<Arc<dyn ChannelSender>> = vec![slow, fast];

        let outcomes = run_fanout(
            &senders,
            &[NotificationChannel::Realtime, NotificationChannel::Email],
            &Recipient::bare("u1"),
            &sample_notification(),
            Duration::from_millis(20),
        )
        .await;

        let email_outcome = outcomes
            .iter()
            .find(|(c, _)| *c == NotificationChannel::Email)
            .map(|(_, o)| o.clone())
            .unwrap();
        assert!(matches!(email_outcome, SendOutcome::Failed(reason) if reason.contains("timed out")));

        let delivered = delivered_channels(&outcomes);
        assert_eq!(delivered, [NotificationChannel::Realtime]);
    }

    #[tokio::test]
    async fn skipped_channels_are_not_marked_delivered() {
        let realtime = MockSender::new(NotificationChannel::Realtime, SendOutcome::Skipped);
        let senders: Vec<Arc<dyn ChannelSender>> = vec![realtime];

        let policy = DeliveryPolicy::default();
        let outcomes = run_fanout(
            &senders,
            policy.channels_for(NotificationPriority::Low),
            &Recipient::bare("offline-user"),
            &sample_notification(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcomes, [(NotificationChannel::Realtime, SendOutcome::Skipped)]);
        assert!(delivered_channels(&outcomes).is_empty());
    }
}
