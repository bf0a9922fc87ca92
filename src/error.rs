// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::models::response::ApiResponse;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized (missing or unknown user id)
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., concurrent like)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON envelope with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    "Something went wrong on our side. Please try again later.".to_string(),
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                "Please check your input.".to_string(),
            ),
            AppError::AuthError(msg) => (
                StatusCode::UNAUTHORIZED,
                msg,
                "Authentication required.".to_string(),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                msg,
                "The requested resource does not exist.".to_string(),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                msg,
                "Please retry the request.".to_string(),
            ),
        };

        (status, Json(ApiResponse::failure(error, message))).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
