//! Identity verification DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Auth payload produced by the SDK's `authenticate`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResultPayload {
    /// Access token to verify.
    #[serde(default)]
    pub access_token: Option<String>,
    /// User as claimed by the client. Not trusted.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Request body for `POST /api/pi/verify`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// The SDK auth result.
    #[serde(default)]
    pub auth_result: Option<AuthResultPayload>,
}

/// Response body for a successful verification.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    /// User payload as returned by the upstream `/me` endpoint.
    pub user: serde_json::Value,
}
