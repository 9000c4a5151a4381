use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid file type. Only JPEG, PNG, GIF, and PDF files are allowed.")]
    InvalidFileType,

    #[error("File size too large. Maximum size is 5MB.")]
    FileTooLarge,

    #[error("Duplicate file detected")]
    DuplicateFile,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file path")]
    PathTraversal,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body: `{error, details?}`
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidFileType => (
                StatusCode::BAD_REQUEST,
                "Invalid file type. Only JPEG, PNG, GIF, and PDF files are allowed.".to_string(),
                None,
            ),
            AppError::FileTooLarge => (
                StatusCode::BAD_REQUEST,
                "File size too large. Maximum size is 5MB.".to_string(),
                None,
            ),
            AppError::DuplicateFile => (
                StatusCode::BAD_REQUEST,
                "Duplicate file detected".to_string(),
                Some("This file has already been uploaded".to_string()),
            ),
            AppError::NotFound(details) => (
                StatusCode::NOT_FOUND,
                "File not found".to_string(),
                Some(details),
            ),
            AppError::PathTraversal => (
                StatusCode::BAD_REQUEST,
                "Invalid file path".to_string(),
                Some("File path is outside of allowed upload directories".to_string()),
            ),
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(msg),
                )
            }
        };

        let body = Json(ErrorBody { error, details });
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
