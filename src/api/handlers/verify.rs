//! Identity verification handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{VerifyRequest, VerifyResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/pi/verify` — Verify an SDK access token server-side.
///
/// # Errors
///
/// Returns [`GatewayError`] if the token is missing, the API key is not
/// configured, or the upstream identity check rejects the token.
#[utoipa::path(
    post,
    path = "/api/pi/verify",
    tag = "Identity",
    summary = "Verify a Pi access token",
    description = "Calls the upstream `/me` endpoint with the server-held API key and the client's access token.",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verified user", body = VerifyResponse),
        (status = 400, description = "Missing access token", body = ErrorResponse),
        (status = 401, description = "Upstream rejected the token", body = ErrorResponse),
        (status = 500, description = "Not configured or upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn verify_auth(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(req) = payload?;
    let access_token = req.auth_result.and_then(|a| a.access_token);
    let user = state.identity.verify(access_token.as_deref()).await?;
    Ok(Json(VerifyResponse { user }))
}

/// Identity routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pi/verify", post(verify_auth))
}
