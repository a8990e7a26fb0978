use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::{password, AuthedUser};
use crate::db::{RepositoryError, UserOperations};
use crate::models::user::UserChanges;
use crate::schemas::user::{UserPublic, UserUpdateRequest};
use crate::AppState;
use actix_web::{delete, get, patch, web, HttpResponse};

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/users")
            .app_data(web::Data::new(state.user_ops.clone()))
            .service(get_me)
            .service(update_me)
            .service(delete_me),
    );
}

#[utoipa::path(
    tag = "Users",
    responses((status = 200, description = "Own profile", body = UserPublic)),
    summary = "Get own profile"
)]
#[get("/me")]
pub(super) async fn get_me(
    user_ops: web::Data<UserOperations>,
    authed: AuthedUser,
) -> Result<HttpResponse, ApiError> {
    let ops = user_ops.get_ref().clone();
    let user_id = authed.user_id();
    let user = blocking(move || ops.get_user_by_id(user_id)).await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

#[utoipa::path(
    tag = "Users",
    request_body = UserUpdateRequest,
    responses((status = 200, description = "Updated profile", body = UserPublic)),
    summary = "Partially update own profile"
)]
#[patch("/me")]
pub(super) async fn update_me(
    user_ops: web::Data<UserOperations>,
    authed: AuthedUser,
    req_data: web::Json<UserUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let UserUpdateRequest {
        full_name,
        phone_number,
        email,
        password: plain,
        avatar_url,
    } = req_data.into_inner();

    if let Some(ref new_password) = plain {
        if new_password.len() < 8 {
            return Err(ApiError::validation(
                "password must be at least 8 characters",
            ));
        }
    }

    let ops = user_ops.get_ref().clone();
    let user_id = authed.user_id();
    let user = blocking(move || {
        let password_hash = match plain {
            Some(new_password) => Some(password::hash_password(&new_password).map_err(|e| {
                RepositoryError::Validation(format!("password hashing failed: {e}"))
            })?),
            None => None,
        };
        ops.update_user(
            user_id,
            UserChanges {
                full_name,
                phone_number,
                email,
                password_hash,
                avatar_url,
            },
        )
    })
    .await?;

    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

#[utoipa::path(
    tag = "Users",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 404, description = "Account missing", body = ErrorBody)
    ),
    summary = "Delete own account"
)]
#[delete("/me")]
pub(super) async fn delete_me(
    user_ops: web::Data<UserOperations>,
    authed: AuthedUser,
) -> Result<HttpResponse, ApiError> {
    let ops = user_ops.get_ref().clone();
    let user_id = authed.user_id();
    blocking(move || ops.delete_user(user_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
