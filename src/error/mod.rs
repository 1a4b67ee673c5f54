use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Client input errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing parameters: {0}")]
    MissingParameters(String),

    // Upstream gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Persistence errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors (missing secrets fail closed here)
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingParameters(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::MissingParameters(_) => "MISSING_PARAMETERS",
            AppError::Gateway(_) | AppError::HttpClient(_) => "ORDER_CREATION_FAILED",
            AppError::Database(_) | AppError::Storage(_) | AppError::Io(_) => "STORAGE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message that is safe to return to a client. Internal causes are
    /// logged here and replaced with a generic description.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::MissingParameters(msg)
            | AppError::Gateway(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::HttpClient(e) => {
                tracing::error!("HTTP client error: {:?}", e);
                "Failed to communicate with payment gateway".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal storage error occurred".to_string()
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                "An internal storage error occurred".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                "An internal storage error occurred".to_string()
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server configuration error".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Invalid data format".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An unexpected error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: self.client_message(),
            details: None,
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
