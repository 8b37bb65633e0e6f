//! Payment lifecycle proxy handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{PaymentActionRequest, ProxyStatusResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/pi` — Forward a payment action to the Pi payments API.
///
/// # Errors
///
/// Returns [`GatewayError`] for malformed JSON, a missing API key, a
/// missing or unknown action, a missing `paymentId`, or a transport
/// failure. Upstream non-2xx replies are forwarded, not converted.
#[utoipa::path(
    post,
    path = "/api/pi",
    tag = "Payments",
    summary = "Proxy a payment action",
    description = "Forwards approve/complete/cancel to the Pi payments API and mirrors the upstream status and JSON body. `engage` and `ping` are answered locally.",
    request_body = PaymentActionRequest,
    responses(
        (status = 200, description = "Upstream reply or local acknowledgement", body = serde_json::Value),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Not configured or upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn proxy_action(
    State(state): State<AppState>,
    payload: Result<Json<PaymentActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(req) = payload?;
    let reply = state.payments.handle(req.into()).await?;
    Ok(reply)
}

/// `GET /api/pi` — Proxy status line.
#[utoipa::path(
    get,
    path = "/api/pi",
    tag = "Payments",
    summary = "Proxy status",
    responses(
        (status = 200, description = "Proxy is up", body = ProxyStatusResponse),
    )
)]
pub async fn proxy_status() -> impl IntoResponse {
    Json(ProxyStatusResponse {
        status: "Pi payments API OK".to_string(),
    })
}

/// Payment proxy routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pi", get(proxy_status).post(proxy_action))
}
