//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] covers failures the gateway produces itself. Non-2xx
//! replies from the upstream Pi API are *not* errors here: the proxy
//! forwards them verbatim (see [`crate::service::ProxyReply`]).

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: missing paymentId",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category       | HTTP Status               |
/// |-----------|----------------|---------------------------|
/// | 1000–1999 | Validation     | 400 Bad Request           |
/// | 2000–2999 | Authentication | 401 Unauthorized          |
/// | 3000–3999 | Server         | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required configuration variable is missing.
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream identity check rejected the access token.
    #[error("Pi authentication verification failed.")]
    VerificationFailed {
        /// Upstream response text.
        details: String,
    },

    /// Mock payment store failure.
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    /// Transport-level failure talking to the upstream Pi API.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::VerificationFailed { .. } => 2001,
            Self::Internal(_) => 3000,
            Self::Store(_) => 3001,
            Self::Upstream(_) => 3002,
            Self::NotConfigured(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::VerificationFailed { .. } => StatusCode::UNAUTHORIZED,
            Self::NotConfigured(_) | Self::Store(_) | Self::Upstream(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed to clients. Server-side failures get a generic
    /// message; the full error is only logged.
    fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Upstream(_) | Self::Internal(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let details = match &self {
            Self::VerificationFailed { details } => Some(details.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
