use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::app_state::AppState;
use crate::core::jwt_auth::jwt_auth::JwtAuth;
use crate::errors::Error;
use crate::models::push_subscriptions::PushSubscription;
use crate::routes::subscription::dtos::requests::{
    DeactivatePushSubscriptionRequestDto, RegisterPushSubscriptionRequestDto,
};

pub fn create_route() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register_push_subscription))
        .routes(routes!(deactivate_push_subscription))
}

#[utoipa::path(
    description = "Register or refresh a device registration for mobile push notifications.",
    summary = "Register push subscription",
    post,
    request_body(
        content = RegisterPushSubscriptionRequestDto,
        content_type = "application/json",
    ),
    tag = "Subscription APIs",
    path = "/api/v1/push-subscriptions",
    responses(
        (status = 200, description = "Push subscription registered"),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn register_push_subscription(
    JwtAuth(claims): JwtAuth,
    Json(request): Json<RegisterPushSubscriptionRequestDto>,
) -> Result<(), Error> {
    PushSubscription::register(
        claims.user_id,
        request.device_id,
        request.token,
        request.platform,
        request.auth_key,
        request.p256dh_key,
    )
    .await
    .map_err(|e| Error::internal_err(&format!("Failed to register push subscription: {e}")))?;

    Ok(())
}

#[utoipa::path(
    summary = "Deactivate push subscription",
    patch,
    request_body(
        content = DeactivatePushSubscriptionRequestDto,
        content_type = "application/json",
    ),
    tag = "Subscription APIs",
    path = "/api/v1/push-subscriptions",
    responses(
        (status = 200, description = "Push subscription deactivated"),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not Found"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn deactivate_push_subscription(
    JwtAuth(claims): JwtAuth,
    Json(request): Json<DeactivatePushSubscriptionRequestDto>,
) -> Result<(), Error> {
    PushSubscription::deactivate_by_user_and_device(claims.user_id, &request.device_id).await?;

    Ok(())
}
