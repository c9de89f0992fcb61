//! Error handling for the FIFO allocation server
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{AllocationError, UnresolvedFieldError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Upload errors
    #[error("Missing upload: {0}")]
    MissingUpload(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Allocation errors
    #[error(transparent)]
    UnresolvedField(#[from] UnresolvedFieldError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::UnresolvedField(e) => AppError::UnresolvedField(e),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::MissingUpload(part) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "MISSING_UPLOAD".to_string(),
                    message_en: format!("The {} table was not uploaded", part),
                    message_es: format!("No se cargó la tabla {}", part),
                    field: Some(part.clone()),
                },
            ),
            AppError::InvalidUpload(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_UPLOAD".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("Archivo inválido: {}", msg),
                    field: None,
                },
            ),
            AppError::Multipart(e) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_UPLOAD".to_string(),
                    message_en: format!("Malformed multipart body: {}", e),
                    message_es: format!("Cuerpo multipart inválido: {}", e),
                    field: None,
                },
            ),
            AppError::Csv(e) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_UPLOAD".to_string(),
                    message_en: format!("Could not read CSV: {}", e),
                    message_es: format!("No se pudo leer el CSV: {}", e),
                    field: None,
                },
            ),
            AppError::UnresolvedField(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "UNRESOLVED_FIELD".to_string(),
                    message_en: format!(
                        "No column in the {} table contains \"{}\"",
                        e.table, e.keyword
                    ),
                    message_es: format!(
                        "Ninguna columna de la tabla {} contiene \"{}\"",
                        e.table, e.keyword
                    ),
                    field: Some(e.keyword.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_es: format!("No se encontró {}", resource),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
