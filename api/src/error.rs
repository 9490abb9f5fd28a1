use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use berth_common::{caller::CallerError, views::ApiErrorResponse};
use berth_db::storage::StoreError;
use thiserror::Error;

use crate::certs::{CertError, ValidationError};

const NOT_FOUND: &str = "The requested resource was not found.";
const FORBIDDEN: &str = "You do not have permission to perform this action.";
const UNAUTHORIZED: &str = "You are not authenticated to perform this action.";
const INTERNAL: &str = "Something went wrong on our end. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Certificate(#[from] CertError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    CallerError(#[from] CallerError),
}

impl ApiError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Status, error code and client-facing message for this error.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NotFound", NOT_FOUND.into()),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "BadRequest", message.clone())
            }
            ApiError::Certificate(ce) => match ce {
                CertError::ResourceNotFound(_) => {
                    (StatusCode::NOT_FOUND, "ResourceNotFound", ce.to_string())
                }
                CertError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", FORBIDDEN.into()),
                CertError::MalformedBody(message) => {
                    (StatusCode::BAD_REQUEST, "BadRequest", message.clone())
                }
                CertError::Validation(ve) => {
                    let code = match ve {
                        ValidationError::InvalidCertificate(_) => "InvalidCertificate",
                        ValidationError::InvalidKey(_) => "InvalidKey",
                        ValidationError::KeyMismatch => "KeyMismatch",
                        ValidationError::MissingCommonName => "MissingCommonName",
                    };
                    (StatusCode::BAD_REQUEST, code, ve.to_string())
                }
                CertError::AlreadyExists(_) => {
                    (StatusCode::BAD_REQUEST, "AlreadyExists", ce.to_string())
                }
                CertError::RecordNotFound(_) => {
                    (StatusCode::NOT_FOUND, "RecordNotFound", ce.to_string())
                }
                CertError::CommonNameMismatch { .. } => {
                    (StatusCode::BAD_REQUEST, "CommonNameMismatch", ce.to_string())
                }
                CertError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", INTERNAL.into())
                }
            },
            ApiError::Storage(se) => match se {
                StoreError::NotFound => (StatusCode::NOT_FOUND, "NotFound", NOT_FOUND.into()),
                StoreError::AlreadyExists => (
                    StatusCode::BAD_REQUEST,
                    "AlreadyExists",
                    "A record with this name already exists.".into(),
                ),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", INTERNAL.into()),
            },
            ApiError::CallerError(ce) => match ce {
                CallerError::Forbidden { .. } => {
                    (StatusCode::FORBIDDEN, "Forbidden", FORBIDDEN.into())
                }
                CallerError::Unauthorized { .. } => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized", UNAUTHORIZED.into())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, code, message) = self.classify();

        if status_code.is_server_error() {
            tracing::error!("Error returned by handler: {self}");
        } else {
            tracing::debug!(%status_code, "Request rejected: {self}");
        }

        let body = ApiErrorResponse {
            code: Some(code.into()),
            message,

            #[cfg(debug_assertions)]
            details: Some(self.to_string()),

            #[cfg(not(debug_assertions))]
            details: None,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use berth_common::guard::Operation;

    use super::*;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn certificate_errors_map_to_documented_statuses() {
        assert_eq!(
            status(CertError::ResourceNotFound("app".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(CertError::Forbidden(Operation::CreateCertificate)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(CertError::Validation(ValidationError::KeyMismatch)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(CertError::AlreadyExists("a.example.com".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(CertError::RecordNotFound("a.example.com".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(CertError::CommonNameMismatch {
                expected: "a".into(),
                found: "b".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(CertError::Storage(StoreError::Internal("boom".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn caller_errors_map_to_auth_statuses() {
        assert_eq!(
            status(CallerError::unauthorized(None)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status(CallerError::forbidden("admin")), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_errors_do_not_leak_their_message() {
        let (_, code, message) =
            ApiError::from(StoreError::Internal("connection reset".into())).classify();
        assert_eq!(code, "InternalError");
        assert_eq!(message, INTERNAL);
    }
}
