use async_trait::async_trait;

use crate::config::APP_CONFIG;
use crate::core::channels::{ChannelSender, Recipient, SendOutcome};
use crate::enums::NotificationChannel;
use crate::models::notifications::Notification;
use crate::models::push_subscriptions::PushSubscription;

/// Delivers through FCM to every active device registration of the
/// recipient. A single dead endpoint deactivates that registration only;
/// the outcome is `Delivered` as long as at least one device accepted.
pub struct PushSender {
    client: fcm_notification::FcmNotification,
}

impl PushSender {
    pub fn new() -> eyre::Result<Self> {
        let client =
            fcm_notification::FcmNotification::new(APP_CONFIG.firebase_credentials_path.as_str())
                .map_err(|e| eyre::eyre!("Failed to create FCM client: {e}"))?;

        Ok(Self { client })
    }
}

/// FCM reports a permanently-gone registration with these markers.
fn is_gone_endpoint(reason: &str) -> bool {
    reason.contains("UNREGISTERED") || reason.contains("NOT_FOUND") || reason.contains("INVALID_ARGUMENT")
}

#[async_trait]
impl ChannelSender for PushSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Push
    }

    async fn send(&self, recipient: &Recipient, notification: &Notification) -> SendOutcome {
        let subscriptions = match PushSubscription::active_for_user(&recipient.user_id).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                return SendOutcome::Failed(format!("failed to load push subscriptions: {e}"));
            }
        };

        if subscriptions.is_empty() {
            return SendOutcome::Skipped;
        }

        let title = notification.kind.title();
        let mut accepted = 0usize;
        let mut last_error = String::new();

        for subscription in &subscriptions {
            let payload = fcm_notification::NotificationPayload {
                token: subscription.token.as_str(),
                title,
                body: notification.body.as_str(),
                data: None,
            };

            match self.client.send_notification(&payload).await {
                Ok(_) => {
                    accepted += 1;
                    if let Some(id) = &subscription.id {
                        if let Err(e) = PushSubscription::touch_last_used(id).await {
                            tracing::warn!("Failed to update lastUsedAt for subscription: {e}");
                        }
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    tracing::error!(
                        "Push send failed for user {} device {}: {reason}",
                        recipient.user_id,
                        subscription.device_id
                    );

                    if is_gone_endpoint(&reason) {
                        if let Some(id) = &subscription.id {
                            if let Err(e) = PushSubscription::deactivate_by_id(id).await {
                                tracing::warn!("Failed to deactivate dead subscription: {e}");
                            } else {
                                tracing::info!(
                                    "Deactivated expired push subscription for user {} device {}",
                                    recipient.user_id,
                                    subscription.device_id
                                );
                            }
                        }
                    }

                    last_error = reason;
                }
            }
        }

        if accepted > 0 {
            SendOutcome::Delivered
        } else {
            SendOutcome::Failed(format!(
                "all {} push attempt(s) failed, last error: {last_error}",
                subscriptions.len()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gone_endpoint_markers_are_recognized() {
        assert!(is_gone_endpoint("404 NOT_FOUND: requested entity was not found"));
        assert!(is_gone_endpoint("UNREGISTERED"));
        assert!(!is_gone_endpoint("503 service unavailable"));
    }
}
