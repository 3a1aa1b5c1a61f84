use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::HttpAuthScheme;
use utoipa::openapi::security::HttpBuilder;
use utoipa::openapi::security::SecurityScheme;

use crate::enums::{NotificationChannel, NotificationKind, NotificationPriority, ReferenceModel};
use crate::models::notifications::NotificationReference;
use crate::routes::notification::dto::{
    DeletedCountResponseDto, DispatchNotificationRequestDto, ListNotificationsResponseDto,
    MarkManyReadRequestDto, MarkNotificationAsReadResponseDto, ModifiedCountResponseDto,
    NotificationDto, PurgeNotificationsRequestDto,
};
use crate::routes::subscription::dtos::requests::{
    DeactivatePushSubscriptionRequestDto, RegisterPushSubscriptionRequestDto,
};
use crate::utils::pagination::PaginationResponseDto;

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityModifier),
    servers(
        (url = "/"),
    ),
    components(
        schemas(
            // Notification DTOs
            NotificationDto,
            NotificationReference,
            ListNotificationsResponseDto,
            MarkNotificationAsReadResponseDto,
            MarkManyReadRequestDto,
            ModifiedCountResponseDto,
            DeletedCountResponseDto,
            PurgeNotificationsRequestDto,
            DispatchNotificationRequestDto,

            // Subscription DTOs
            RegisterPushSubscriptionRequestDto,
            DeactivatePushSubscriptionRequestDto,

            // Enums
            NotificationKind,
            NotificationPriority,
            NotificationChannel,
            ReferenceModel,

            // Pagination
            PaginationResponseDto<NotificationDto>,
        )
    ),
    tags(
        (name = "Notification APIs", description = "Notification listing, state transitions and dispatch"),
        (name = "Subscription APIs", description = "Push subscription management endpoints"),
        (name = "Health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

struct SecurityModifier;
impl Modify for SecurityModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
