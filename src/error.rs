// src/error.rs
use std::ops::RangeInclusive;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid credentials")]
    Unauthorized,

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Database(e) => {
                error!("database error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn option_count_invalid(limits: RangeInclusive<usize>, count: usize) -> ApiError {
    ApiError::BadRequest(format!(
        "poll must have between {} and {} options, got {count}",
        limits.start(),
        limits.end()
    ))
}

pub fn bidding_time_invalid(limits: RangeInclusive<i64>, minutes: i64) -> ApiError {
    ApiError::BadRequest(format!(
        "bidding time must be between {} and {} minutes, got {minutes}",
        limits.start(),
        limits.end()
    ))
}

pub fn title_invalid_size(limits: RangeInclusive<usize>, len: usize) -> ApiError {
    ApiError::BadRequest(format!(
        "poll title must be between {} and {} characters, got {len}",
        limits.start(),
        limits.end()
    ))
}

pub fn duplicate_vote() -> ApiError {
    ApiError::BadRequest(String::from("Already voted"))
}

pub fn poll_closed() -> ApiError {
    ApiError::BadRequest(String::from("Poll is no longer accepting votes"))
}
