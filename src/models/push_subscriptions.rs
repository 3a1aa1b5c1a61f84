use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;
use wither::Model as WitherModel;
use wither::bson::DateTime;
use wither::bson::{doc, oid::ObjectId};
use wither::mongodb::Database;

use crate::database;
use crate::enums::PushSubscriptionStatus;
use crate::errors::Error;
use crate::utils::models::ModelExt;

#[async_trait]
impl ModelExt for PushSubscription {
    async fn get_connection() -> &'static Database {
        database::connection().await
    }
}

/// A device registration for mobile push. Many per user; each can be
/// deactivated on its own without touching the others.
#[derive(Debug, Clone, Serialize, Deserialize, WitherModel, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub device_id: String,
    pub token: String,
    pub platform: Option<String>,
    pub auth_key: Option<String>,
    pub p256dh_key: Option<String>,
    pub status: String,
    pub last_used_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl PushSubscription {
    pub async fn register(
        user_id: String,
        device_id: String,
        token: String,
        platform: Option<String>,
        auth_key: Option<String>,
        p256dh_key: Option<String>,
    ) -> Result<Self, Error> {
        let now = DateTime::now();

        let query = doc! {
            "deviceId": &device_id,
        };

        let update = doc! {
            "$set": {
                "userId": &user_id,
                "deviceId": &device_id,
                "token": &token,
                "platform": platform.as_ref(),
                "authKey": auth_key.as_ref(),
                "p256dhKey": p256dh_key.as_ref(),
                "status": PushSubscriptionStatus::Active.to_string(),
                "updatedAt": now,
            },
            "$setOnInsert": {
                "createdAt": now,
            }
        };

        let result = <Self as ModelExt>::find_one_and_update(query, update, true).await?;

        result.ok_or_else(|| {
            let msg = format!(
                "Failed to register push subscription for user_id={user_id}, device_id={device_id}"
            );
            Error::internal_err(&msg)
        })
    }

    pub async fn deactivate_by_user_and_device(
        user_id: String,
        device_id: &String,
    ) -> Result<Self, Error> {
        let now = DateTime::now();

        let query = doc! {
            "deviceId": device_id,
            "userId": &user_id,
        };

        let update = doc! {
            "$set": {
                "status": PushSubscriptionStatus::Inactive.to_string(),
                "updatedAt": now,
            }
        };

        let result = <Self as ModelExt>::find_one_and_update(query, update, false).await?;

        result.ok_or_else(|| {
            let msg =
                format!("No push subscription found for user_id={user_id}, device_id={device_id}");
            Error::not_found(&msg)
        })
    }

    pub async fn active_for_user(user_id: &str) -> Result<Vec<Self>, Error> {
        let query = doc! {
            "userId": user_id,
            "status": PushSubscriptionStatus::Active.to_string(),
        };

        <Self as ModelExt>::find(query, None).await
    }

    /// Used by the push sender when the transport reports the endpoint as
    /// gone. Only the offending subscription is touched.
    pub async fn deactivate_by_id(id: &ObjectId) -> Result<(), Error> {
        let now = DateTime::now();

        <Self as ModelExt>::update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "status": PushSubscriptionStatus::Inactive.to_string(),
                "updatedAt": now,
            }},
            None,
        )
        .await?;

        Ok(())
    }

    pub async fn touch_last_used(id: &ObjectId) -> Result<(), Error> {
        let now = DateTime::now();

        <Self as ModelExt>::update_one(
            doc! { "_id": id },
            doc! { "$set": { "lastUsedAt": now, "updatedAt": now } },
            None,
        )
        .await?;

        Ok(())
    }
}
