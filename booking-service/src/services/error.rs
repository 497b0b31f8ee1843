use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(anyhow::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(anyhow::Error),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Payment signature mismatch")]
    SignatureMismatch,

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(anyhow::Error::new(err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthenticated(anyhow::Error::new(err))
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        AppError::Email(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope {
            success: bool,
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }

        let (status, message, error) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Unauthenticated(err) => {
                (StatusCode::UNAUTHORIZED, err.to_string(), None)
            }
            AppError::PermissionDenied(err) => (StatusCode::FORBIDDEN, err.to_string(), None),
            AppError::InvalidStatus(target) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid status: {}", target),
                None,
            ),
            AppError::SignatureMismatch => (
                StatusCode::BAD_REQUEST,
                "Payment verification failed - invalid signature".to_string(),
                None,
            ),
            AppError::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Some(err.to_string()),
            ),
            AppError::Email(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Email error".to_string(),
                Some(msg),
            ),
            AppError::Config(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorEnvelope {
                success: false,
                message,
                error,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (
                AppError::Validation("tutorId is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound(anyhow::anyhow!("Booking not found")),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Unauthenticated(anyhow::anyhow!("Missing token")),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::PermissionDenied(anyhow::anyhow!("Not your booking")),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::InvalidStatus("confirmed".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::SignatureMismatch, StatusCode::BAD_REQUEST),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
