use async_trait::async_trait;
use serde_json::json;

use crate::config::APP_CONFIG;
use crate::core::channels::{ChannelSender, Recipient, SendOutcome};
use crate::enums::NotificationChannel;
use crate::models::notifications::Notification;

/// Sends a templated text message through the transactional WhatsApp API.
/// Recipients without a phone number on file are skipped.
pub struct WhatsappSender {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl WhatsappSender {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: APP_CONFIG.whatsapp_api_url.clone(),
            api_key: APP_CONFIG.whatsapp_api_key.clone(),
        }
    }
}

pub fn render_text(notification: &Notification) -> String {
    format!("{}: {}", notification.kind.title(), notification.body)
}

#[async_trait]
impl ChannelSender for WhatsappSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Whatsapp
    }

    async fn send(&self, recipient: &Recipient, notification: &Notification) -> SendOutcome {
        let Some(phone) = recipient.phone.as_deref() else {
            return SendOutcome::Skipped;
        };

        let payload = json!({
            "to": phone,
            "type": "text",
            "text": { "body": render_text(notification) },
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => SendOutcome::Delivered,
            Ok(response) => SendOutcome::Failed(format!(
                "WhatsApp API returned status {}",
                response.status()
            )),
            Err(e) => SendOutcome::Failed(format!("WhatsApp API request failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::enums::{NotificationKind, NotificationPriority};

    use super::*;

    #[test]
    fn rendered_text_carries_title_and_body() {
        let notification = Notification::new(
            "u1".to_string(),
            NotificationKind::Grade,
            "Matemáticas: 9/10".to_string(),
            NotificationPriority::High,
            None,
            None,
            None,
        );
        let text = render_text(&notification);
        assert!(text.starts_with("Calificación publicada"));
        assert!(text.contains("Matemáticas: 9/10"));
    }
}
