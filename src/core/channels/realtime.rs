use std::sync::Arc;

use async_trait::async_trait;
use bson::DateTime;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::cache::redis_emitter::get_redis_emitter;
use crate::core::channels::{ChannelSender, Recipient, SendOutcome};
use crate::core::presence::PresenceRegistry;
use crate::enums::{NotificationChannel, NotificationKind, NotificationPriority};
use crate::models::notifications::Notification;

pub const NEW_NOTIFICATION_EVENT: &str = "NewNotification";
pub const UNREAD_COUNT_EVENT: &str = "UnreadCount";

pub fn user_room(user_id: &str) -> String {
    format!("notification:user:{user_id}")
}

/// Compact wire payload for the socket event. Short field names keep the
/// frame small for mobile clients.
#[derive(Serialize, Deserialize)]
pub struct PubNotification {
    #[serde(rename = "i")]
    pub notification_id: Option<ObjectId>,
    #[serde(rename = "u")]
    pub user_id: String,
    #[serde(rename = "k")]
    pub kind: NotificationKind,
    #[serde(rename = "p")]
    pub priority: NotificationPriority,
    #[serde(rename = "b")]
    pub body: String,
    #[serde(rename = "ca")]
    pub created_at: DateTime,
    #[serde(rename = "uc")]
    pub unread_count: u64,
}

/// Pushes the notification to every live connection of the recipient via
/// the socket.io room, along with the recomputed unread count. An offline
/// recipient is a skip, not a failure.
pub struct RealtimeSender {
    presence: Arc<PresenceRegistry>,
}

impl RealtimeSender {
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self { presence }
    }
}

#[async_trait]
impl ChannelSender for RealtimeSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Realtime
    }

    async fn send(&self, recipient: &Recipient, notification: &Notification) -> SendOutcome {
        let connections = self.presence.connections_for(&recipient.user_id).await;
        if connections.is_empty() {
            return SendOutcome::Skipped;
        }

        // Count is recomputed after the store write, so every device sees a
        // figure that already includes this notification.
        let unread_count = match Notification::unread_count(&recipient.user_id).await {
            Ok(count) => count,
            Err(e) => {
                return SendOutcome::Failed(format!("failed to recompute unread count: {e}"));
            }
        };

        let payload = PubNotification {
            notification_id: notification.id,
            user_id: notification.user_id.clone(),
            kind: notification.kind,
            priority: notification.priority,
            body: notification.body.clone(),
            created_at: notification.created_at,
            unread_count,
        };

        let data = match serde_json::to_string(&payload) {
            Ok(data) => data,
            Err(e) => return SendOutcome::Failed(format!("failed to serialize payload: {e}")),
        };

        let room = user_room(&recipient.user_id);
        let emitter = get_redis_emitter();

        if let Err(e) = emitter.emit_room(&room, NEW_NOTIFICATION_EVENT, &data) {
            return SendOutcome::Failed(e);
        }

        let count_data = json!({ "unreadCount": unread_count }).to_string();
        if let Err(e) = emitter.emit_room(&room, UNREAD_COUNT_EVENT, &count_data) {
            tracing::warn!(
                "Emitted notification but failed to emit unread count for user {}: {e}",
                recipient.user_id
            );
        }

        tracing::info!(
            "Emitted notification to {} connection(s) of user {}",
            connections.len(),
            recipient.user_id
        );

        SendOutcome::Delivered
    }
}
