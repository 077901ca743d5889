//! HTTP mapping of operation and store errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use scholara_store::{FailureCause, OperationError, OperationOutcome, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// A newer request for the same entity started while this one ran.
    #[error("Superseded by a newer request")]
    Superseded,
}

/// Error response body. `cause` lets clients tell an unreachable service
/// from a malformed model answer.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub cause: &'static str,
}

fn cause_name(cause: FailureCause) -> &'static str {
    match cause {
        FailureCause::ServiceUnavailable => "service_unavailable",
        FailureCause::MalformedResponse  => "malformed_response",
        FailureCause::NotFound           => "not_found",
        FailureCause::Integrity          => "integrity",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, cause) = match &self {
            ApiError::Operation(e) => {
                let status = match e.cause {
                    FailureCause::NotFound => StatusCode::NOT_FOUND,
                    FailureCause::Integrity => StatusCode::CONFLICT,
                    FailureCause::ServiceUnavailable | FailureCause::MalformedResponse => StatusCode::BAD_GATEWAY,
                };
                (status, cause_name(e.cause))
            }
            ApiError::Store(StoreError::NotFound { .. }) | ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Store(_) => (StatusCode::CONFLICT, "integrity"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Superseded => (StatusCode::CONFLICT, "superseded"),
        };

        // Operation errors expose only their fixed user message.
        let body = ErrorBody { error: self.to_string(), cause };
        (status, Json(body)).into_response()
    }
}

/// Unwrap an applied outcome, or report that it was superseded.
pub fn applied<T>(outcome: OperationOutcome<T>) -> Result<T, ApiError> {
    outcome.applied().ok_or(ApiError::Superseded)
}
