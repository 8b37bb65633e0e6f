//! Mock payment handlers for reviewers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    MockPaymentListResponse, MockPaymentRequest, MockPaymentResponse, ResetResponse,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::MockOutcome;

/// `GET /api/pi/mock-payments` — List mock payments.
///
/// # Errors
///
/// Returns [`GatewayError::Store`] on backend failure.
#[utoipa::path(
    get,
    path = "/api/pi/mock-payments",
    tag = "Mock Payments",
    summary = "List mock payments",
    description = "Returns every mock payment in insertion order.",
    responses(
        (status = 200, description = "Mock payments", body = MockPaymentListResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_mock_payments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let payments = state.mock_payments.list().await?;
    Ok(Json(MockPaymentListResponse { payments }))
}

/// `POST /api/pi/mock-payments` — Apply a mock payment action.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for malformed JSON, a missing
/// identifier or an unknown action.
#[utoipa::path(
    post,
    path = "/api/pi/mock-payments",
    tag = "Mock Payments",
    summary = "Apply a mock payment action",
    description = "`init` (default) creates or re-creates the payment as pending server approval; `approve`, `complete` and `cancel` overwrite the status; `reset` deletes the record.",
    request_body = MockPaymentRequest,
    responses(
        (status = 200, description = "Updated payment, or `{ok: true}` for reset", body = MockPaymentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn apply_mock_action(
    State(state): State<AppState>,
    payload: Result<Json<MockPaymentRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(req) = payload?;
    let outcome = state
        .mock_payments
        .apply(
            req.identifier.as_deref(),
            req.action.as_deref(),
            req.amount,
            req.memo,
        )
        .await?;

    Ok(match outcome {
        MockOutcome::Payment(payment) => Json(MockPaymentResponse { payment }).into_response(),
        MockOutcome::Reset => Json(ResetResponse { ok: true }).into_response(),
    })
}

/// Mock payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/pi/mock-payments",
        get(list_mock_payments).post(apply_mock_action),
    )
}
