pub mod email;
pub mod push;
pub mod realtime;
pub mod whatsapp;

use async_trait::async_trait;

use crate::enums::NotificationChannel;
use crate::models::accounts::Account;
use crate::models::notifications::Notification;

/// Contact view of a recipient, resolved once per fan-out so every sender
/// works from the same snapshot.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Recipient {
    pub fn from_account(account: Account) -> Self {
        Self {
            user_id: account.user_id,
            display_name: account.display_name,
            email: account.email,
            phone: account.phone,
        }
    }

    /// Fallback when the recipient has no account document. Realtime and
    /// push only need the user id; WhatsApp and email will skip.
    pub fn bare(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: String::new(),
            email: None,
            phone: None,
        }
    }
}

/// Result of one channel's send attempt. `Skipped` means the channel had
/// nothing to do (offline user, no phone on file); it is not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Skipped,
    Failed(String),
}

/// One delivery transport. Implementations must contain their own failures:
/// `send` reports an outcome, it never panics or propagates errors.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    fn channel(&self) -> NotificationChannel;

    async fn send(&self, recipient: &Recipient, notification: &Notification) -> SendOutcome;
}
