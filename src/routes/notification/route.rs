use axum::Json;
use axum::extract::{Path, Query, State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;
use wither::bson::oid::ObjectId;

use crate::app_state::AppState;
use crate::core::dispatcher::DispatchRequest;
use crate::core::jwt_auth::jwt_auth::JwtAuth;
use crate::enums::UserRole;
use crate::errors::Error;
use crate::models::notifications::{Notification, NotificationFilter};
use crate::routes::notification::dto::{
    DeletedCountResponseDto, DispatchNotificationRequestDto, ListNotificationsResponseDto,
    MarkManyReadRequestDto, MarkNotificationAsReadResponseDto, ModifiedCountResponseDto,
    NotificationDto, NotificationFilterQuery, PurgeNotificationsRequestDto,
};
use crate::utils::pagination::{PaginationQuery, PaginationResponseDto};

pub fn create_route() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_notifications))
        .routes(routes!(mark_notification_read))
        .routes(routes!(mark_many_read))
        .routes(routes!(mark_all_read))
        .routes(routes!(delete_notification))
        .routes(routes!(purge_notifications))
        .routes(routes!(dispatch_notification))
}

fn parse_object_id(id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(id).map_err(|_| Error::ParseObjectID(id.to_string()))
}

#[utoipa::path(
    summary = "List own notifications",
    description = "Returns the authenticated user's notifications newest-first, with total and unread counts.",
    get,
    tag = "Notification APIs",
    path = "/api/v1/notifications",
    params(NotificationFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Notification page", body = ListNotificationsResponseDto),
        (status = 401, description = "Unauthorized"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn list_notifications(
    JwtAuth(claims): JwtAuth,
    Query(filter): Query<NotificationFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ListNotificationsResponseDto>, Error> {
    let filter = NotificationFilter {
        kind: filter.kind,
        is_read: filter.is_read,
    };

    let page = Notification::list_for_user(&claims.user_id, &filter, &pagination).await?;

    let docs = page
        .docs
        .into_iter()
        .map(NotificationDto::from)
        .collect::<Vec<_>>();

    Ok(Json(ListNotificationsResponseDto {
        unread_count: page.unread,
        page: PaginationResponseDto::new(docs, page.total, &pagination),
    }))
}

#[utoipa::path(
    summary = "Mark a notification as read",
    description = "Idempotent. Responds 404 for ids that do not exist or belong to another user.",
    patch,
    tag = "Notification APIs",
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked as read", body = MarkNotificationAsReadResponseDto),
        (status = 404, description = "Not Found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn mark_notification_read(
    JwtAuth(claims): JwtAuth,
    Path(id): Path<String>,
) -> Result<Json<MarkNotificationAsReadResponseDto>, Error> {
    let object_id = parse_object_id(&id)?;

    Notification::mark_read(&object_id, &claims.user_id).await?;

    Ok(Json(MarkNotificationAsReadResponseDto {
        notification_id: id,
        is_read: true,
    }))
}

#[utoipa::path(
    summary = "Mark several notifications as read",
    post,
    request_body(
        content = MarkManyReadRequestDto,
        content_type = "application/json",
    ),
    tag = "Notification APIs",
    path = "/api/v1/notifications/read-many",
    responses(
        (status = 200, description = "Number of notifications modified", body = ModifiedCountResponseDto),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn mark_many_read(
    JwtAuth(claims): JwtAuth,
    Json(request): Json<MarkManyReadRequestDto>,
) -> Result<Json<ModifiedCountResponseDto>, Error> {
    let ids = request
        .ids
        .iter()
        .map(|id| parse_object_id(id))
        .collect::<Result<Vec<_>, Error>>()?;

    let modified = Notification::mark_many_read(&ids, &claims.user_id).await?;

    Ok(Json(ModifiedCountResponseDto { modified }))
}

#[utoipa::path(
    summary = "Mark all notifications as read",
    post,
    tag = "Notification APIs",
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications modified", body = ModifiedCountResponseDto),
        (status = 401, description = "Unauthorized"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn mark_all_read(
    JwtAuth(claims): JwtAuth,
) -> Result<Json<ModifiedCountResponseDto>, Error> {
    let modified = Notification::mark_all_read(&claims.user_id).await?;

    Ok(Json(ModifiedCountResponseDto { modified }))
}

#[utoipa::path(
    summary = "Delete a notification",
    description = "Permanent, ownership-scoped delete.",
    delete,
    tag = "Notification APIs",
    path = "/api/v1/notifications/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Not Found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn delete_notification(
    JwtAuth(claims): JwtAuth,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let object_id = parse_object_id(&id)?;

    Notification::delete_by_owner(&object_id, &claims.user_id).await?;

    Ok(())
}

#[utoipa::path(
    summary = "Purge old read notifications",
    description = "Deletes the user's read notifications older than the given number of days.",
    post,
    request_body(
        content = PurgeNotificationsRequestDto,
        content_type = "application/json",
    ),
    tag = "Notification APIs",
    path = "/api/v1/notifications/purge",
    responses(
        (status = 200, description = "Number of notifications deleted", body = DeletedCountResponseDto),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn purge_notifications(
    JwtAuth(claims): JwtAuth,
    Json(request): Json<PurgeNotificationsRequestDto>,
) -> Result<Json<DeletedCountResponseDto>, Error> {
    request
        .validate()
        .map_err(|e| Error::bad_request(&format!("Validation error: {e}")))?;

    let deleted =
        Notification::purge_read_older_than(&claims.user_id, request.older_than_days).await?;

    Ok(Json(DeletedCountResponseDto { deleted }))
}

#[utoipa::path(
    summary = "Dispatch a notification",
    description = "Producer entry point: persists the notification and fans delivery out in the background. Admin only.",
    post,
    request_body(
        content = DispatchNotificationRequestDto,
        content_type = "application/json",
    ),
    tag = "Notification APIs",
    path = "/api/v1/notifications/dispatch",
    responses(
        (status = 200, description = "Created notification", body = NotificationDto),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
    ("bearer_auth" = [])
    )
)]
pub async fn dispatch_notification(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    Json(request): Json<DispatchNotificationRequestDto>,
) -> Result<Json<NotificationDto>, Error> {
    claims.require_role(UserRole::Admin)?;

    request
        .validate()
        .map_err(|e| Error::bad_request(&format!("Validation error: {e}")))?;

    let notification = state
        .coordinator
        .dispatch(DispatchRequest {
            user_id: request.user_id,
            kind: request.kind,
            body: request.body,
            priority: request.priority,
            reference: request.reference,
            metadata: request.metadata,
            group_key: request.group_key,
        })
        .await?;

    Ok(Json(NotificationDto::from(notification)))
}
