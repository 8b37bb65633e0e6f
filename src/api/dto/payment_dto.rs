//! Payment proxy DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::ActionCommand;

/// Request body for `POST /api/pi`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentActionRequest {
    /// One of `approve`, `complete`, `cancel`, `engage`, `ping`.
    #[serde(default)]
    pub action: Option<String>,
    /// Wallet SDK payment identifier. Required for forwarded actions.
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Blockchain transaction id, sent with `complete`.
    #[serde(default)]
    pub txid: Option<String>,
    /// User uid, logged by `engage`.
    #[serde(default)]
    pub uid: Option<String>,
}

impl From<PaymentActionRequest> for ActionCommand {
    fn from(req: PaymentActionRequest) -> Self {
        Self {
            action: req.action,
            payment_id: req.payment_id,
            txid: req.txid,
            uid: req.uid,
        }
    }
}

/// Response body for `GET /api/pi`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProxyStatusResponse {
    /// Human-readable status line.
    pub status: String,
}

/// Response body for `GET /api/pi/sdk-config`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfigResponse {
    /// SDK protocol version passed to `init`.
    pub version: String,
    /// App id, when configured.
    pub app_id: Option<String>,
    /// Whether the sandbox environment is targeted.
    pub sandbox: bool,
}
