use async_trait::async_trait;
use serde_json::json;

use crate::config::APP_CONFIG;
use crate::core::channels::{ChannelSender, Recipient, SendOutcome};
use crate::enums::NotificationChannel;
use crate::models::notifications::Notification;

/// Renders a small HTML message and posts it to the transactional email
/// API. Recipients without an email on file are skipped.
pub struct EmailSender {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: String,
}

impl EmailSender {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: APP_CONFIG.email_api_url.clone(),
            api_key: APP_CONFIG.email_api_key.clone(),
            sender: APP_CONFIG.email_sender.clone(),
        }
    }
}

pub fn render_html(recipient: &Recipient, notification: &Notification) -> String {
    let greeting = if recipient.display_name.is_empty() {
        "Hola".to_string()
    } else {
        format!("Hola {}", recipient.display_name)
    };

    format!(
        "<html><body>\
         <p>{greeting},</p>\
         <h3>{}</h3>\
         <p>{}</p>\
         <p style=\"color:#888;font-size:12px\">Este es un mensaje automático, no respondas a este correo.</p>\
         </body></html>",
        notification.kind.title(),
        notification.body,
    )
}

#[async_trait]
impl ChannelSender for EmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, recipient: &Recipient, notification: &Notification) -> SendOutcome {
        let Some(email) = recipient.email.as_deref() else {
            return SendOutcome::Skipped;
        };

        let payload = json!({
            "from": self.sender,
            "to": email,
            "subject": notification.kind.title(),
            "html": render_html(recipient, notification),
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
            Ok(response) => {
                SendOutcome::Failed(format!("email API returned status {}", response.status()))
            }
            Err(e) => SendOutcome::Failed(format!("email API request failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::enums::{NotificationKind, NotificationPriority};

    use super::*;

    #[test]
    fn html_includes_greeting_title_and_body() {
        let recipient = Recipient {
            user_id: "u1".to_string(),
            display_name: "Ana".to_string(),
            email: Some("ana@example.com".to_string()),
            phone: None,
        };
        let notification = Notification::new(
            "u1".to_string(),
            NotificationKind::Task,
            "Entregar el ensayo antes del viernes".to_string(),
            NotificationPriority::High,
            None,
            None,
            None,
        );

        let html = render_html(&recipient, &notification);
        assert!(html.contains("Hola Ana"));
        assert!(html.contains("Nueva tarea"));
        assert!(html.contains("Entregar el ensayo antes del viernes"));
    }

    #[test]
    fn greeting_falls_back_without_display_name() {
        let recipient = Recipient::bare("u1");
        let notification = Notification::new(
            "u1".to_string(),
            NotificationKind::System,
            "Mantenimiento programado".to_string(),
            NotificationPriority::Low,
            None,
            None,
            None,
        );

        assert!(render_html(&recipient, &notification).contains("<p>Hola,</p>"));
    }
}
