//! Values owned by the Pi platform and passed through the gateway.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A payment as reported by the wallet SDK or the upstream payments API.
///
/// The gateway forwards these values without interpreting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PiPayment {
    /// Payment identifier assigned by the platform.
    pub identifier: String,
    /// Payment amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Free-form memo shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// App-defined metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Uid of the paying user, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_uid: Option<String>,
}

/// An authenticated Pioneer as returned by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PiUser {
    /// App-scoped user id.
    pub uid: String,
    /// Pi username.
    #[serde(default)]
    pub username: String,
    /// Platform roles.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Result of a successful SDK authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    /// Short-lived access token to be verified server-side.
    pub access_token: String,
    /// The authenticated user.
    pub user: PiUser,
}
