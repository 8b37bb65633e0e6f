//! Thin HTTP client for the upstream Pi platform API.
//!
//! Every call returns the upstream status and body as a [`ProxyReply`];
//! only transport failures surface as errors. No retries and no timeout
//! beyond the `reqwest` defaults.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use serde::Serialize;

use crate::config::{ApiKey, ConfigError};
use crate::error::GatewayError;

/// Status and JSON body of a reply, forwarded to the caller as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    /// HTTP status to answer with.
    pub status: StatusCode,
    /// JSON body to answer with.
    pub body: serde_json::Value,
}

impl ProxyReply {
    /// A locally produced `200 OK` reply.
    #[must_use]
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Lower-cased concatenation of the error fields the Pi API uses
    /// (`error`, `error_message`, `message`), for classification.
    #[must_use]
    pub fn error_text(&self) -> String {
        ["error", "error_message", "message"]
            .iter()
            .filter_map(|field| self.body.get(*field).and_then(|v| v.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self.body)).into_response()
    }
}

/// Payment endpoints of the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEndpoint {
    /// `POST /payments/{id}/approve`
    Approve,
    /// `POST /payments/{id}/complete`
    Complete,
    /// `POST /payments/{id}/cancel`
    Cancel,
}

impl PaymentEndpoint {
    /// Path segment for the endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Serialize)]
struct CompleteBody<'a> {
    txid: Option<&'a str>,
}

/// HTTP client for the Pi platform API.
#[derive(Debug, Clone)]
pub struct PiApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PiApiClient {
    /// Creates a client rooted at `base_url` (e.g. `https://api.minepi.com/v2`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `base_url` is not an
    /// absolute hierarchical URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "PI_API_BASE_URL",
            value: base_url.to_string(),
        };
        let base_url = Url::parse(base_url).map_err(|_| invalid())?;
        if base_url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// Calls a payment endpoint for `payment_id`.
    ///
    /// `complete` sends `{"txid": txid}` (null when absent); the other
    /// endpoints send no body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] on transport failure.
    pub async fn payment_action(
        &self,
        key: &ApiKey,
        payment_id: &str,
        endpoint: PaymentEndpoint,
        txid: Option<&str>,
    ) -> Result<ProxyReply, GatewayError> {
        let url = self.endpoint(&["payments", payment_id, endpoint.as_str()])?;
        let request = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, key.authorization());
        let request = match endpoint {
            PaymentEndpoint::Complete => request.json(&CompleteBody { txid }),
            PaymentEndpoint::Approve | PaymentEndpoint::Cancel => request,
        };

        let response = request.send().await?;
        let reply = read_reply(response).await?;
        tracing::debug!(
            payment_id,
            action = endpoint.as_str(),
            status = reply.status.as_u16(),
            "upstream payment call"
        );
        Ok(reply)
    }

    /// Calls `GET /me` with the user's access token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] on transport failure.
    pub async fn me(&self, key: &ApiKey, access_token: &str) -> Result<ProxyReply, GatewayError> {
        let url = self.endpoint(&["me"])?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, key.authorization())
            .header("X-Auth-Token", access_token)
            .send()
            .await?;
        read_reply(response).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Internal("upstream base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Reads an upstream response into a [`ProxyReply`]. Non-JSON bodies are
/// wrapped as `{"raw": text}`; an empty body becomes `null`.
async fn read_reply(response: reqwest::Response) -> Result<ProxyReply, GatewayError> {
    let status = response.status();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
    };
    Ok(ProxyReply { status, body })
}
