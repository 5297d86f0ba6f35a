use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::user_repository::RepositoryError;
use crate::services::auth_service::AuthServiceError;
use crate::services::pending_registrations::OtpError;
use crate::services::registration_service::RegistrationError;
use crate::services::token_service::TokenError;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Top-level API error. Every handler failure funnels into one of these
/// variants; `IntoResponse` maps each to a status code and a JSON body of
/// the form `{"message": "..."}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    EmailExists,

    #[error("No pending registration found for this email")]
    PendingRegistrationNotFound,

    #[error("OTP has expired")]
    OtpExpired,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please verify your email first")]
    EmailNotVerified,

    #[error("Authentication token is missing")]
    MissingToken,

    // Malformed, tampered and expired tokens all collapse here so the
    // response never reveals which check failed.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    // Covers both "no such note" and "someone else's note".
    #[error("Note not found")]
    NoteNotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            AppError::PendingRegistrationNotFound
            | AppError::OtpExpired
            | AppError::InvalidOtp => (StatusCode::BAD_REQUEST, self.to_string()),

            AppError::EmailExists => (StatusCode::CONFLICT, self.to_string()),

            AppError::InvalidCredentials
            | AppError::EmailNotVerified
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::UserNotFound => (StatusCode::UNAUTHORIZED, self.to_string()),

            AppError::NoteNotFound => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::NotFound => AppError::NoteNotFound,
            RepositoryError::AlreadyExists => AppError::EmailExists,
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::EmailTaken => AppError::EmailExists,
            RegistrationError::Otp(OtpError::NotFound) => AppError::PendingRegistrationNotFound,
            RegistrationError::Otp(OtpError::Expired) => AppError::OtpExpired,
            RegistrationError::Otp(OtpError::Mismatch) => AppError::InvalidOtp,
            RegistrationError::Hashing(msg) => AppError::Internal(msg),
            RegistrationError::Repository(RepositoryError::AlreadyExists) => AppError::EmailExists,
            RegistrationError::Repository(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => AppError::InvalidCredentials,
            AuthServiceError::EmailNotVerified => AppError::EmailNotVerified,
            AuthServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::InvalidToken,
            TokenError::Creation(msg) => AppError::Internal(msg),
        }
    }
}
