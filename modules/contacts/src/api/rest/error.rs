use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::rest::dto::{ErrorBody, FieldErrorDto, ValidationErrorBody};
use crate::domain::error::DomainError;
use crate::domain::validation::FieldError;

pub const CONTACT_NOT_FOUND: &str = "Contact not found";
pub const EMAIL_NOT_UNIQUE: &str = "Email must be unique";
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// Everything a contacts handler can fail with, already shaped for the wire.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{}", CONTACT_NOT_FOUND)]
    NotFound,
    #[error("{}", EMAIL_NOT_UNIQUE)]
    EmailNotUnique,
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("internal error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = ValidationErrorBody {
                    errors: errors.into_iter().map(FieldErrorDto::from).collect(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => error_response(StatusCode::NOT_FOUND, CONTACT_NOT_FOUND),
            ApiError::EmailNotUnique => error_response(StatusCode::BAD_REQUEST, EMAIL_NOT_UNIQUE),
            ApiError::Internal(detail) => {
                // Details stay in the logs
                tracing::error!(%detail, "Request failed with internal error");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        }
    }
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: msg.into() })).into_response()
}

/// Map domain errors onto the HTTP taxonomy.
pub fn map_domain_error(e: DomainError) -> ApiError {
    match e {
        DomainError::ContactNotFound { .. } => ApiError::NotFound,
        DomainError::EmailAlreadyExists { .. } => ApiError::EmailNotUnique,
        DomainError::Validation { errors } => ApiError::Validation(errors),
        DomainError::Database { message } => ApiError::Internal(message),
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        map_domain_error(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
