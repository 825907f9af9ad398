// src/error.rs
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // bcrypt failed to hash (verification failures are handled in auth_service)
    #[error("Failed to process password")]
    PasswordHashingError,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Not found")]
    NotFound,

    #[error("Unexpected internal error")]
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Full detail goes to the log, the user only gets a generic message
        tracing::error!("Handled error: {:?}", self);

        let (status, user_message) = match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not access the data store.")
            }
            AppError::EnvVarError(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error.")
            }
            AppError::PasswordHashingError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not process credentials.")
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong with your session.")
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "The requested resource was not found."),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred."),
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Error</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Error {status_code}</h1><p>{message}</p><a href="/">Home</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;

/// Errors raised while taking in a probe image on the recognition service.
/// These are the only failures that turn into a non-200 response there.
#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("No selected file")]
    EmptyFilename,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("No image provided or failed to decode")]
    NoImage,

    #[error("Upload could not be stored: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for RecognizeError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RecognizeError::Storage(_) => {
                tracing::error!("Probe storage failed: {:?}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => {
                tracing::debug!("Rejected probe: {}", self);
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(json!({ "success": false, "message": self.to_string() }))).into_response()
    }
}
