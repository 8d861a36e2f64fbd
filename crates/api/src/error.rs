//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::FlowError;
use domain::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed ids, bodies).
    BadRequest(String),
    /// The request carried no resolvable identity.
    Unauthenticated(String),
    /// Flow error from the services.
    Flow(FlowError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, false),
            ApiError::Flow(err) => flow_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, false)
            }
        };

        let body = if retryable {
            serde_json::json!({ "error": message, "retryable": true })
        } else {
            serde_json::json!({ "error": message })
        };
        (status, axum::Json(body)).into_response()
    }
}

fn flow_error_to_response(err: FlowError) -> (StatusCode, String, bool) {
    match &err {
        // Missing resources: surfaced, never retried.
        FlowError::ProductNotFound(_) | FlowError::OrderNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string(), false)
        }

        // User-flow errors: recoverable, surfaced verbatim so the UI can
        // redirect to the missing step.
        FlowError::Checkout(_) | FlowError::NothingToCapture(_) => {
            (StatusCode::BAD_REQUEST, err.to_string(), false)
        }
        FlowError::Order(OrderError::InvalidTransition { .. })
        | FlowError::Order(OrderError::AlreadyPaid) => {
            (StatusCode::BAD_REQUEST, err.to_string(), false)
        }

        FlowError::Unauthorized => (StatusCode::FORBIDDEN, err.to_string(), false),

        // External failures: retryable by the caller.
        FlowError::GatewayFailure { retryable, .. } => {
            (StatusCode::BAD_GATEWAY, err.to_string(), *retryable)
        }
        FlowError::GatewayTimeout { .. } => (StatusCode::BAD_GATEWAY, err.to_string(), true),

        // Broken invariants or store failures are system faults.
        FlowError::Order(_) | FlowError::Store(_) => {
            tracing::error!(error = %err, "flow error treated as internal");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), false)
        }
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        ApiError::Flow(err)
    }
}
