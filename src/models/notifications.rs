use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use wither::Model as WitherModel;
use wither::bson::DateTime;
use wither::bson::{Document, doc, oid::ObjectId};
use wither::mongodb::Database;
use wither::mongodb::options::FindOptions;

use crate::database;
use crate::enums::{NotificationChannel, NotificationKind, NotificationPriority, ReferenceModel};
use crate::errors::Error;
use crate::utils::models::ModelExt;
use crate::utils::pagination::PaginationQuery;

#[async_trait]
impl ModelExt for Notification {
    async fn get_connection() -> &'static Database {
        database::connection().await
    }
}

/// One notification document per (event, recipient). The recipient and the
/// creation timestamp are never mutated; `is_read` and the per-channel
/// delivery flags only ever transition false to true.
#[derive(Debug, Clone, Serialize, Deserialize, WitherModel, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub kind: NotificationKind,
    #[validate(length(min = 1, max = 500))]
    pub body: String,
    pub priority: NotificationPriority,
    pub is_read: bool,
    pub created_at: DateTime,
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

/// Deep-link to the entity that produced the notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReference {
    pub model: ReferenceModel,
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub kind: Option<NotificationKind>,
    pub is_read: Option<bool>,
}

pub struct NotificationPage {
    pub docs: Vec<Notification>,
    pub total: u64,
    pub unread: u64,
}

impl Notification {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        kind: NotificationKind,
        body: String,
        priority: NotificationPriority,
        reference: Option<NotificationReference>,
        metadata: Option<HashMap<String, String>>,
        group_key: Option<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            kind,
            body,
            priority,
            is_read: false,
            created_at: DateTime::now(),
            reference,
            metadata,
            delivered_realtime: false,
            delivered_push: false,
            delivered_whatsapp: false,
            delivered_email: false,
            group_key,
        }
    }

    /// Ownership is always enforced by addressing documents through the
    /// (id, recipient) pair, never by id alone. A foreign id and an absent
    /// id are indistinguishable to the caller.
    fn owned_query(id: &ObjectId, user_id: &str) -> Document {
        doc! { "_id": id, "userId": user_id }
    }

    /// Marking read carries no `isRead` precondition, so repeating it
    /// matches the same document and stays a no-op.
    fn read_update() -> Document {
        doc! { "$set": { "isRead": true } }
    }

    /// Owner-initiated purge: only read documents past the cutoff.
    fn purge_query(user_id: &str, cutoff: DateTime) -> Document {
        doc! {
            "userId": user_id,
            "isRead": true,
            "createdAt": { "$lt": cutoff },
        }
    }

    /// Retention purge: everything past the horizon, read or not.
    fn expiry_query(cutoff: DateTime) -> Document {
        doc! { "createdAt": { "$lt": cutoff } }
    }

    fn filter_query(user_id: &str, filter: &NotificationFilter) -> Document {
        let mut query = doc! { "userId": user_id };
        if let Some(kind) = filter.kind {
            query.insert("kind", kind.to_string());
        }
        if let Some(is_read) = filter.is_read {
            query.insert("isRead", is_read);
        }
        query
    }

    pub async fn list_for_user(
        user_id: &str,
        filter: &NotificationFilter,
        pagination: &PaginationQuery,
    ) -> Result<NotificationPage, Error> {
        let query = Self::filter_query(user_id, filter);
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(pagination.skip() as u64)
            .limit(pagination.limit() as i64)
            .build();

        let (docs, total) = <Self as ModelExt>::find_and_count(query, options).await?;
        let unread = Self::unread_count(user_id).await?;

        Ok(NotificationPage {
            docs,
            total,
            unread,
        })
    }

    pub async fn unread_count(user_id: &str) -> Result<u64, Error> {
        <Self as ModelExt>::count(doc! { "userId": user_id, "isRead": false }).await
    }

    /// Idempotent: marking an already-read notification matches the document
    /// and succeeds without modifying it.
    pub async fn mark_read(id: &ObjectId, user_id: &str) -> Result<(), Error> {
        let result =
            <Self as ModelExt>::update_one(Self::owned_query(id, user_id), Self::read_update(), None)
                .await?;

        if result.matched_count == 0 {
            return Err(Error::not_found("Notification not found"));
        }

        Ok(())
    }

    pub async fn mark_many_read(ids: &[ObjectId], user_id: &str) -> Result<u64, Error> {
        let result = <Self as ModelExt>::update_many(
            doc! { "_id": { "$in": ids }, "userId": user_id, "isRead": false },
            Self::read_update(),
            None,
        )
        .await?;

        Ok(result.modified_count)
    }

    pub async fn mark_all_read(user_id: &str) -> Result<u64, Error> {
        let result = <Self as ModelExt>::update_many(
            doc! { "userId": user_id, "isRead": false },
            Self::read_update(),
            None,
        )
        .await?;

        Ok(result.modified_count)
    }

    pub async fn delete_by_owner(id: &ObjectId, user_id: &str) -> Result<(), Error> {
        let result = <Self as ModelExt>::delete_one(Self::owned_query(id, user_id)).await?;

        if result.deleted_count == 0 {
            return Err(Error::not_found("Notification not found"));
        }

        Ok(())
    }

    /// Removes the owner's read notifications older than the cutoff. Unread
    /// documents are kept regardless of age.
    pub async fn purge_read_older_than(user_id: &str, older_than_days: i64) -> Result<u64, Error> {
        let cutoff = cutoff_date(older_than_days);
        let result = <Self as ModelExt>::delete_many(Self::purge_query(user_id, cutoff)).await?;

        Ok(result.deleted_count)
    }

    /// Retention horizon for the background task: everything past the
    /// horizon goes, read or not.
    pub async fn purge_expired(retention_days: i64) -> Result<u64, Error> {
        let cutoff = cutoff_date(retention_days);
        let result = <Self as ModelExt>::delete_many(Self::expiry_query(cutoff)).await?;

        Ok(result.deleted_count)
    }

    /// Persists the delivery flags for every channel that was accepted, as a
    /// single combined update.
    pub async fn mark_channels_delivered(
        id: &ObjectId,
        channels: &[NotificationChannel],
    ) -> Result<(), Error> {
        if channels.is_empty() {
            return Ok(());
        }

        let mut set = Document::new();
        for channel in channels {
            set.insert(channel.delivered_field(), true);
        }

        <Self as ModelExt>::update_one(doc! { "_id": id }, doc! { "$set": set }, None).await?;

        Ok(())
    }
}

fn cutoff_date(days: i64) -> DateTime {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(days);
    DateTime::from_chrono(cutoff)
}

#[cfg(test)]
mod tests {
    use validator::Validate;
    use wither::bson::oid::ObjectId;

    use super::*;

    fn sample(body: &str) -> Notification {
        Notification::new(
            "user-1".to_string(),
            NotificationKind::Task,
            body.to_string(),
            NotificationPriority::Medium,
            None,
            None,
            None,
        )
    }

    #[test]
    fn new_notification_starts_unread_with_no_channels_delivered() {
        let n = sample("Nueva tarea publicada");
        assert!(!n.is_read);
        assert!(!n.delivered_realtime);
        assert!(!n.delivered_push);
        assert!(!n.delivered_whatsapp);
        assert!(!n.delivered_email);
        assert!(n.id.is_none());
    }

    #[test]
    fn body_length_is_bounded() {
        assert!(sample("hola").validate().is_ok());
        assert!(sample("").validate().is_err());
        assert!(sample(&"x".repeat(500)).validate().is_ok());
        assert!(sample(&"x".repeat(501)).validate().is_err());
    }

    #[test]
    fn owned_query_combines_id_and_recipient() {
        let id = ObjectId::new();
        let query = Notification::owned_query(&id, "user-1");
        assert_eq!(query.get_object_id("_id").unwrap(), id);
        assert_eq!(query.get_str("userId").unwrap(), "user-1");
    }

    #[test]
    fn mark_read_is_idempotent_by_construction() {
        // The match query carries no isRead precondition, so a second
        // mark-read still matches the document instead of reporting 404.
        let id = ObjectId::new();
        let query = Notification::owned_query(&id, "user-1");
        assert!(!query.contains_key("isRead"));

        let update = Notification::read_update();
        let set = update.get_document("$set").unwrap();
        assert!(set.get_bool("isRead").unwrap());
        assert_eq!(set.len(), 1);
        assert_eq!(update.len(), 1);
    }

    #[test]
    fn purge_query_keeps_unread_documents() {
        let cutoff = cutoff_date(30);
        let query = Notification::purge_query("user-1", cutoff);
        assert_eq!(query.get_str("userId").unwrap(), "user-1");
        assert!(query.get_bool("isRead").unwrap());
        let created_at = query.get_document("createdAt").unwrap();
        assert_eq!(created_at.get_datetime("$lt").unwrap(), &cutoff);
    }

    #[test]
    fn expiry_query_removes_regardless_of_read_state() {
        let cutoff = cutoff_date(90);
        let query = Notification::expiry_query(cutoff);
        assert!(!query.contains_key("isRead"));
        assert!(!query.contains_key("userId"));
        let created_at = query.get_document("createdAt").unwrap();
        assert_eq!(created_at.get_datetime("$lt").unwrap(), &cutoff);
    }

    #[test]
    fn cutoff_date_lies_in_the_past() {
        let cutoff = cutoff_date(30).to_chrono();
        let expected = chrono::Utc::now() - chrono::Duration::days(30);
        let drift = (cutoff - expected).num_seconds().abs();
        assert!(drift < 5);
        assert!(cutoff < chrono::Utc::now());
    }

    #[test]
    fn filter_query_includes_only_requested_fields() {
        let query = Notification::filter_query("user-1", &NotificationFilter::default());
        assert!(!query.contains_key("kind"));
        assert!(!query.contains_key("isRead"));

        let query = Notification::filter_query(
            "user-1",
            &NotificationFilter {
                kind: Some(NotificationKind::Grade),
                is_read: Some(false),
            },
        );
        assert_eq!(query.get_str("kind").unwrap(), "grade");
        assert!(!query.get_bool("isRead").unwrap());
    }
}
