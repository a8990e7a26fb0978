use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::{issue_token, password, AuthConfig};
use crate::db::{RepositoryError, UserOperations};
use crate::models::user::NewUser;
use crate::schemas::auth::{LoginRequest, SignupRequest, TokenResponse};
use crate::schemas::user::UserPublic;
use crate::AppState;
use actix_web::{post, web, HttpResponse};
use log::{debug, error};

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/auth")
            .app_data(web::Data::new(state.user_ops.clone()))
            .app_data(web::Data::new(state.auth_cfg.clone()))
            .service(signup)
            .service(login),
    );
}

#[utoipa::path(
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserPublic),
        (status = 400, description = "Duplicate email or phone number", body = ErrorBody)
    ),
    summary = "Register a new account"
)]
#[post("/signup")]
pub(super) async fn signup(
    user_ops: web::Data<UserOperations>,
    req_data: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let SignupRequest {
        full_name,
        phone_number,
        email,
        password: plain,
        role,
    } = req_data.into_inner();

    if plain.len() < 8 {
        return Err(ApiError::validation(
            "password must be at least 8 characters",
        ));
    }
    if !email.contains('@') {
        return Err(ApiError::validation("email address is invalid"));
    }

    let ops = user_ops.get_ref().clone();
    let user = blocking(move || {
        let password_hash = password::hash_password(&plain)
            .map_err(|e| RepositoryError::Validation(format!("password hashing failed: {e}")))?;
        ops.create_user(NewUser {
            full_name,
            phone_number,
            email,
            password_hash,
            role,
            avatar_url: None,
        })
    })
    .await?;

    debug!("signup: created user {} ({})", user.user_id, user.email);
    Ok(HttpResponse::Created().json(UserPublic::from(user)))
}

#[utoipa::path(
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    summary = "Authenticate and receive an access token"
)]
#[post("/login")]
pub(super) async fn login(
    user_ops: web::Data<UserOperations>,
    auth_cfg: web::Data<AuthConfig>,
    req_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let LoginRequest { email, password: plain } = req_data.into_inner();

    let ops = user_ops.get_ref().clone();
    let verified = blocking(move || {
        let user = match ops.get_user_by_email(&email) {
            Ok(user) => user,
            Err(RepositoryError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if password::verify_password(&plain, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    })
    .await?;

    let user = verified.ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;
    let token = issue_token(user.user_id, user.role, &auth_cfg).map_err(|e| {
        error!("login: failed to issue token for user {}: {}", user.user_id, e);
        ApiError::internal()
    })?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}
