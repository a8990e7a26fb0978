use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::{AdminUser, AuthedUser};
use crate::db::NotificationOperations;
use crate::models::notification::{NewNotification, Notification};
use crate::schemas::notification::NotificationCreateRequest;
use crate::schemas::{PageQuery, PaginationResponse};
use crate::AppState;
use actix_web::{get, post, web, HttpResponse};

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/notifications")
            .app_data(web::Data::new(state.notification_ops.clone()))
            .service(my_notifications)
            .service(create_notification)
            .service(mark_notification_read),
    );
}

#[utoipa::path(
    tag = "Notifications",
    request_body = NotificationCreateRequest,
    responses((status = 201, description = "Notification fanned out", body = Notification)),
    summary = "Broadcast a notification"
)]
#[post("")]
pub(super) async fn create_notification(
    notification_ops: web::Data<NotificationOperations>,
    _admin: AdminUser,
    req_data: web::Json<NotificationCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let NotificationCreateRequest {
        title,
        message,
        is_important,
        user_ids,
    } = req_data.into_inner();

    let ops = notification_ops.get_ref().clone();
    let notification = blocking(move || {
        ops.create_notification(
            NewNotification {
                title,
                message,
                is_important,
            },
            user_ids,
        )
    })
    .await?;
    Ok(HttpResponse::Created().json(notification))
}

#[utoipa::path(
    tag = "Notifications",
    params(PageQuery),
    responses((status = 200, description = "Own notifications with read flags")),
    summary = "List own notifications"
)]
#[get("/me")]
pub(super) async fn my_notifications(
    notification_ops: web::Data<NotificationOperations>,
    authed: AuthedUser,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (skip, limit) = (page.skip(), page.limit());
    let ops = notification_ops.get_ref().clone();
    let user = authed.user_id();
    let data = blocking(move || ops.list_user_notifications(user, skip, limit)).await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Notifications",
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "No such notification for this user", body = ErrorBody)
    ),
    summary = "Mark a notification as read"
)]
#[post("/{notification_id}/read")]
pub(super) async fn mark_notification_read(
    notification_ops: web::Data<NotificationOperations>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let notification_id = path.into_inner();
    let ops = notification_ops.get_ref().clone();
    let user = authed.user_id();
    blocking(move || ops.mark_as_read(notification_id, user)).await?;
    Ok(HttpResponse::NoContent().finish())
}
