//! Error handling - every failure becomes an RFC 7807 response with a code.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use quill_core::DomainError;
use quill_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    /// Body or path could not be parsed.
    BadRequest(String),
    /// Body parsed but broke validation rules.
    Validation(Vec<String>),
    Domain(DomainError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Domain(err) => match err {
                DomainError::NotFound { .. } | DomainError::MissingContent => StatusCode::NOT_FOUND,
                DomainError::MissingCredentials
                | DomainError::EmailUnchanged
                | DomainError::PasswordMismatch => StatusCode::BAD_REQUEST,
                DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                DomainError::EmailTaken(_) => StatusCode::CONFLICT,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let error = match self {
            AppError::BadRequest(detail) => {
                ErrorResponse::bad_request(detail).with_code("malformed-request")
            }
            AppError::Validation(errors) => ErrorResponse::new(422, "Validation Failed")
                .with_detail(errors.join(", "))
                .with_code("validation-failed")
                .with_errors(errors.clone()),
            AppError::Domain(DomainError::Internal(detail)) => {
                // Log internal errors, never send them to the client
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::Domain(err) => {
                let title = status.canonical_reason().unwrap_or("Error");
                ErrorResponse::new(status.as_u16(), title)
                    .with_detail(err.to_string())
                    .with_code(err.code())
            }
        };

        HttpResponse::build(status).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Domain(err)
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// JSON extractor settings: malformed bodies get the standard error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Path extractor settings: non-numeric ids get the standard error shape.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
