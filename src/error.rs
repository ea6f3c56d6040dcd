use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::web::json_error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy shared by the stores and the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid email or password")]
    InvalidCredentials,

    /// Missing resource or a resource owned by someone else. The two are never told apart.
    #[error("file not found")]
    NotFound,

    #[error("{0}")]
    InvalidFileType(String),

    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: u64 },

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::InvalidFileType(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthenticated => "unauthenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotFound => "not_found",
            AppError::InvalidFileType(_) => "invalid_file_type",
            AppError::TooLarge { .. } => "too_large",
            AppError::Storage(_) | AppError::Io(_) | AppError::Internal(_) => "storage_error",
        }
    }

    /// Message safe to show to the caller; server-side failures are reduced to a generic line.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Storage(_) | AppError::Io(_) | AppError::Internal(_) => {
                "Server error, please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            error!(err = ?self, "request failed");
        }

        json_error(self.status(), self.category(), self.public_message()).into_response()
    }
}
