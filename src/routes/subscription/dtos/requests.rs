use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, IntoParams, Deserialize, Clone, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPushSubscriptionRequestDto {
    pub device_id: String,
    #[validate(length(min = 1))]
    pub token: String,
    pub platform: Option<String>,
    pub auth_key: Option<String>,
    pub p256dh_key: Option<String>,
}

#[derive(Debug, IntoParams, Deserialize, Clone, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeactivatePushSubscriptionRequestDto {
    pub device_id: String,
}
