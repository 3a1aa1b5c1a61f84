use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::enums::{NotificationKind, NotificationPriority};
use crate::models::notifications::{Notification, NotificationReference};
use crate::utils::pagination::PaginationResponseDto;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub body: String,
    pub priority: NotificationPriority,
    pub is_read: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<NotificationReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    pub delivered_realtime: bool,
    pub delivered_push: bool,
    pub delivered_whatsapp: bool,
    pub delivered_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
}

impl From<Notification> for NotificationDto {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification
                .id
                .map(|id| id.to_hex())
                .unwrap_or_default(),
            user_id: notification.user_id,
            kind: notification.kind,
            body: notification.body,
            priority: notification.priority,
            is_read: notification.is_read,
            created_at: notification
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            reference: notification.reference,
            metadata: notification.metadata,
            delivered_realtime: notification.delivered_realtime,
            delivered_push: notification.delivered_push,
            delivered_whatsapp: notification.delivered_whatsapp,
            delivered_email: notification.delivered_email,
            group_key: notification.group_key,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilterQuery {
    pub kind: Option<NotificationKind>,
    pub is_read: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsResponseDto {
    #[schema(example = 3)]
    pub unread_count: u64,
    pub page: PaginationResponseDto<NotificationDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationAsReadResponseDto {
    pub notification_id: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkManyReadRequestDto {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedCountResponseDto {
    #[schema(example = 2)]
    pub modified: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCountResponseDto {
    #[schema(example = 5)]
    pub deleted: u64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeNotificationsRequestDto {
    #[validate(range(min = 1))]
    #[schema(example = 30)]
    pub older_than_days: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchNotificationRequestDto {
    pub user_id: String,
    pub kind: NotificationKind,
    #[validate(length(min = 1, max = 500))]
    pub body: String,
    pub priority: NotificationPriority,
    pub reference: Option<NotificationReference>,
    pub metadata: Option<HashMap<String, String>>,
    pub group_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_keeps_group_key_from_document() {
        let mut notification = Notification::new(
            "user-1".to_string(),
            NotificationKind::Event,
            "Reunión de padres".to_string(),
            NotificationPriority::Medium,
            None,
            None,
            Some("event:42".to_string()),
        );
        notification.id = Some(wither::bson::oid::ObjectId::new());

        let dto = NotificationDto::from(notification);
        assert_eq!(dto.group_key.as_deref(), Some("event:42"));

        let ungrouped = Notification::new(
            "user-1".to_string(),
            NotificationKind::System,
            "Mantenimiento programado".to_string(),
            NotificationPriority::Low,
            None,
            None,
            None,
        );
        assert!(NotificationDto::from(ungrouped).group_key.is_none());
    }
}
