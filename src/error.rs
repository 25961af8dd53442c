//! Error types for the LMS server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Business error codes carried in the response envelope.
///
/// `0` is success; everything else is a failure the caller must inspect,
/// since the HTTP layer always answers with transport-level 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    AuthInvalid = 2,
    InternalDatabaseError = 3,
    ParamMissing = 4,
    IllegalOperator = 5,
    InvalidUsername = 6,
    InvalidPhone = 7,
    InvalidIsbn = 8,
    InvalidAuthor = 9,

    UserExists = 1000,
    UserNotExist = 1001,
    BookTypeNotFound = 1002,
    BookNotExist = 1003,
    BorrowRecordNotExist = 1004,
    PermissionDenied = 1005,
    BookTypeExists = 1006,
    BookNotAvailable = 1008,
    ReserveDateError = 1009,
    ActionNotAllowed = 1010,
    BookTypeInUse = 1011,
    BorrowNumOver = 1012,
    ReservationNotExist = 1013,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A business-rule or domain failure with a stable code.
    #[error("{message}")]
    Service { code: ErrorCode, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Service {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Service { code, .. } => *code,
            AppError::Database(_) => ErrorCode::InternalDatabaseError,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

/// Failure envelope body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Service { message, .. } => message.clone(),
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                "database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                "internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: self.code() as u32,
            message,
        });

        // Business failures ride on transport-level success; callers
        // dispatch on the envelope code, not the HTTP status.
        (StatusCode::OK, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_keeps_its_code() {
        let err = AppError::new(ErrorCode::BookNotAvailable, "book 7 is checked out");
        assert_eq!(err.code(), ErrorCode::BookNotAvailable);
        assert_eq!(err.to_string(), "book 7 is checked out");
    }

    #[test]
    fn database_error_maps_to_internal_code() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), ErrorCode::InternalDatabaseError);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Success as u32, 0);
        assert_eq!(ErrorCode::UserExists as u32, 1000);
        assert_eq!(ErrorCode::ActionNotAllowed as u32, 1010);
        assert_eq!(ErrorCode::BorrowNumOver as u32, 1012);
    }
}
