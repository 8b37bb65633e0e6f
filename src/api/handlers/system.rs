//! System endpoints: health check, domain validation, SDK config.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::SdkConfigResponse;
use crate::app_state::AppState;
use crate::config::SDK_VERSION;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /.well-known/pi-validation.txt` — Domain ownership token.
#[utoipa::path(
    get,
    path = "/.well-known/pi-validation.txt",
    tag = "System",
    summary = "Pi domain validation token",
    description = "Plain-text token the Pi platform fetches to verify domain ownership.",
    responses(
        (status = 200, description = "Validation token", body = String, content_type = "text/plain"),
    )
)]
pub async fn validation_key_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300, must-revalidate"),
        ],
        format!("{}\n", state.config.validation_key.trim()),
    )
}

/// `GET /api/pi/sdk-config` — Public wallet SDK init parameters.
#[utoipa::path(
    get,
    path = "/api/pi/sdk-config",
    tag = "System",
    summary = "Wallet SDK configuration",
    description = "Returns the protocol version, app id and sandbox flag clients should pass to the SDK's `init`.",
    responses(
        (status = 200, description = "SDK init parameters", body = SdkConfigResponse),
    )
)]
pub async fn sdk_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(SdkConfigResponse {
        version: SDK_VERSION.to_string(),
        app_id: state.config.app_id.clone(),
        sandbox: state.config.sandbox,
    })
}

/// System routes mounted at the root level. The SDK config endpoint is
/// mounted with the other `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/.well-known/pi-validation.txt", get(validation_key_handler))
}
