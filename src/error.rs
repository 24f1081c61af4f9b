//! Error types for the Buch server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::StoreError;

/// Error codes reported in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    DbFailure = 3,
    NoSuchBuch = 5,
    BadValue = 18,
    BuchInvalid = 30,
    TitelExists = 31,
    IsbnExists = 32,
    VersionInvalid = 33,
    VersionOutdated = 34,
    VersionRequired = 35,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Precondition required: {0}")]
    PreconditionRequired(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Rejections of the create path
#[derive(Error, Debug)]
pub enum CreateError {
    #[error("Ungueltiges Buch: {}", .0.join(" "))]
    BuchInvalid(Vec<String>),

    #[error("Der Titel \"{titel}\" existiert bereits.")]
    TitelExists { titel: String, id: Option<Uuid> },

    #[error("Die ISBN \"{isbn}\" existiert bereits.")]
    IsbnExists { isbn: String, id: Option<Uuid> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejections of the update path
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Ungueltiges Buch: {}", .0.join(" "))]
    BuchInvalid(Vec<String>),

    #[error("Der Titel \"{titel}\" existiert bereits.")]
    TitelExists { titel: String, id: Option<Uuid> },

    #[error("Es gibt kein Buch mit der ID \"{0}\".")]
    BuchNotExists(String),

    #[error("Die Versionsnummer \"{0}\" ist ungueltig.")]
    VersionInvalid(String),

    #[error("Die Versionsnummer {supplied} ist nicht aktuell (aktuell: {stored}).")]
    VersionOutdated { supplied: i32, stored: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

fn error_response(status: StatusCode, code: ErrorCode, message: String, details: Vec<String>) -> Response {
    let body = Json(ErrorResponse {
        code: code as u32,
        error: format!("{:?}", code),
        message,
        details,
    });
    (status, body).into_response()
}

fn store_failure(err: &StoreError) -> Response {
    tracing::error!("Store error: {:?}", err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::DbFailure,
        "Database error".to_string(),
        vec![],
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchBuch, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone()),
            AppError::PreconditionRequired(msg) => (
                StatusCode::PRECONDITION_REQUIRED,
                ErrorCode::VersionRequired,
                msg.clone(),
            ),
            AppError::Store(e) => return store_failure(e),
        };

        error_response(status, code, message, vec![])
    }
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            CreateError::BuchInvalid(messages) => {
                error_response(StatusCode::BAD_REQUEST, ErrorCode::BuchInvalid, message, messages)
            }
            CreateError::TitelExists { .. } => {
                error_response(StatusCode::BAD_REQUEST, ErrorCode::TitelExists, message, vec![])
            }
            CreateError::IsbnExists { .. } => {
                error_response(StatusCode::BAD_REQUEST, ErrorCode::IsbnExists, message, vec![])
            }
            CreateError::Store(e) => store_failure(&e),
        }
    }
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, details) = match self {
            UpdateError::BuchInvalid(messages) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BuchInvalid, messages)
            }
            UpdateError::TitelExists { .. } => {
                (StatusCode::PRECONDITION_FAILED, ErrorCode::TitelExists, vec![])
            }
            UpdateError::BuchNotExists(_) => {
                (StatusCode::PRECONDITION_FAILED, ErrorCode::NoSuchBuch, vec![])
            }
            UpdateError::VersionInvalid(_) => {
                (StatusCode::PRECONDITION_FAILED, ErrorCode::VersionInvalid, vec![])
            }
            UpdateError::VersionOutdated { .. } => {
                (StatusCode::PRECONDITION_FAILED, ErrorCode::VersionOutdated, vec![])
            }
            UpdateError::Store(e) => return store_failure(&e),
        };
        error_response(status, code, message, details)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
