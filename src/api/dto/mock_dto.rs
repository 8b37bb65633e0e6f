//! Mock payment DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::MockPayment;

/// Request body for `POST /api/pi/mock-payments`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MockPaymentRequest {
    /// Payment identifier.
    #[serde(default)]
    pub identifier: Option<String>,
    /// One of `init` (default), `approve`, `complete`, `cancel`, `reset`.
    #[serde(default)]
    pub action: Option<String>,
    /// Amount, recorded on `init`.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Memo, recorded on `init`.
    #[serde(default)]
    pub memo: Option<String>,
}

/// Response body carrying a single mock payment.
#[derive(Debug, Serialize, ToSchema)]
pub struct MockPaymentResponse {
    /// The payment after the action was applied.
    pub payment: MockPayment,
}

/// Response body for `GET /api/pi/mock-payments`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MockPaymentListResponse {
    /// All mock payments in insertion order.
    pub payments: Vec<MockPayment>,
}

/// Response body for a `reset` action.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetResponse {
    /// Always `true`.
    pub ok: bool,
}
