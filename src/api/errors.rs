use crate::db::RepositoryError;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpRequest, HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Standard error body returned by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

/// Boundary error: one typed repository kind maps to one status code,
/// here and nowhere else.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: detail.into(),
        }
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "internal server error".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.detail)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorBody {
            detail: self.detail.clone(),
        })
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(_) => ApiError {
                status: StatusCode::NOT_FOUND,
                detail: e.to_string(),
            },
            RepositoryError::Validation(_) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: e.to_string(),
            },
            RepositoryError::InsufficientStock { .. }
            | RepositoryError::InvalidState(_)
            | RepositoryError::Conflict(_) => ApiError {
                status: StatusCode::BAD_REQUEST,
                detail: e.to_string(),
            },
            RepositoryError::Forbidden(_) => ApiError {
                status: StatusCode::FORBIDDEN,
                detail: e.to_string(),
            },
            RepositoryError::DatabaseError(_) | RepositoryError::ConnectionPoolError(_) => {
                error!("internal repository error: {}", e);
                ApiError::internal()
            }
        }
    }
}

pub fn default_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    error!("Error in request: {} \n Error: {}", req.full_url(), err);
    let response = HttpResponse::UnprocessableEntity().json(ErrorBody {
        detail: err.to_string(),
    });
    actix_web::error::InternalError::from_response(err, response).into()
}
