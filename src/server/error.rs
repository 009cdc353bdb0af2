//! HTTP error responses.
//!
//! Every failure is answered with `{"error": "<message>"}` and a status
//! derived from the [`PlenarioError`] kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::PlenarioError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error mapped to an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    /// 400: malformed or invalid request.
    BadRequest(String),
    /// 502: the language model failed.
    BadGateway(String),
    /// 503: a backing store is temporarily unavailable.
    ServiceUnavailable(String),
    /// 500: anything else.
    Internal(String),
}

impl ApiError {
    /// Map a chat failure: input errors are the caller's, the rest the model's.
    pub fn from_chat(err: PlenarioError) -> Self {
        match err {
            PlenarioError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => {
                error!(error = %other, "chat request failed");
                ApiError::BadGateway("failed to get a reply from the language model".into())
            }
        }
    }

    /// Map a survey store failure.
    pub fn from_store(err: PlenarioError) -> Self {
        match err {
            PlenarioError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other if other.is_retryable() => {
                error!(error = %other, "survey store unavailable");
                ApiError::ServiceUnavailable("survey storage unavailable".into())
            }
            other => {
                error!(error = %other, "survey store failed");
                ApiError::Internal("survey storage failed".into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors() {
        assert!(matches!(
            ApiError::from_chat(PlenarioError::InvalidInput("x".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_chat(PlenarioError::AuthenticationFailed),
            ApiError::BadGateway(_)
        ));
    }

    #[test]
    fn store_errors() {
        let io = std::io::Error::other("disk full");
        assert!(matches!(
            ApiError::from_store(PlenarioError::Io(io)),
            ApiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from_store(PlenarioError::Configuration("x".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
