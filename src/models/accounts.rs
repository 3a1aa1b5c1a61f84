use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;
use wither::Model as WitherModel;
use wither::bson::DateTime;
use wither::bson::{doc, oid::ObjectId};
use wither::mongodb::Database;

use crate::database;
use crate::enums::UserRole;
use crate::errors::Error;
use crate::utils::models::ModelExt;

#[async_trait]
impl ModelExt for Account {
    async fn get_connection() -> &'static Database {
        database::connection().await
    }
}

/// Recipient directory entry. The school platform administers accounts;
/// this service only reads them for auth checks and for the contact details
/// the WhatsApp and email senders need.
#[derive(Debug, Clone, Serialize, Deserialize, WitherModel, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub user_name: String,
    pub display_name: String,
    pub role: UserRole,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Account {
    pub async fn get_by_user_id(user_id: &str) -> Result<Option<Account>, Error> {
        <Self as ModelExt>::find_one(doc! { "userId": user_id }, None).await
    }
}
