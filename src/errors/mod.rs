use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Caught locally before any backend call.
    #[error("validation error: {0}")]
    Validation(String),
    /// The backend answered with an `error` field.
    #[error("backend error: {0}")]
    Backend(String),
    /// The backend could not be reached or answered garbage.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(message)
            | AppError::Backend(message)
            | AppError::Transport(message)
            | AppError::NotFound(message)
            | AppError::Internal(message) => message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Backend(message) => (StatusCode::BAD_GATEWAY, message.clone()),
            AppError::Transport(message) => (StatusCode::BAD_GATEWAY, message.clone()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        let body = Json(ErrorResponse { message });
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Backend("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Transport("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn anyhow_errors_become_internal() {
        let error: AppError = anyhow::anyhow!("disk full").into();
        assert!(matches!(error, AppError::Internal(_)));
        assert_eq!(error.user_message(), "disk full");
    }
}
