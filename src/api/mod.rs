//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! Payment, mock-payment and identity endpoints are mounted under `/api`;
//! health and domain validation live at the root.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "pi-gateway", description = "Pi payment lifecycle proxy and mock payment store"),
    paths(
        handlers::payments::proxy_action,
        handlers::payments::proxy_status,
        handlers::mock_payments::list_mock_payments,
        handlers::mock_payments::apply_mock_action,
        handlers::verify::verify_auth,
        handlers::system::health_handler,
        handlers::system::validation_key_handler,
        handlers::system::sdk_config_handler,
    ),
    components(schemas(
        dto::PaymentActionRequest,
        dto::MockPaymentRequest,
        dto::MockPaymentResponse,
        dto::MockPaymentListResponse,
        dto::ResetResponse,
        dto::VerifyRequest,
        dto::VerifyResponse,
        crate::domain::MockPayment,
        crate::domain::MockPaymentStatus,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "Payments", description = "Payment lifecycle proxy"),
        (name = "Mock Payments", description = "Reviewer-facing mock payment store"),
        (name = "Identity", description = "Access token verification"),
        (name = "System", description = "Health and platform integration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the fully layered application: routes, OpenAPI UI (with the
/// `swagger-ui` feature), tracing, CORS and the optional request timeout.
pub fn build_app(state: AppState) -> Router {
    let router = build_router();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    let timeout_secs = state.config.request_timeout_secs;
    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let router = if timeout_secs > 0 {
        router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(timeout_secs),
        ))
    } else {
        router
    };

    router.with_state(state)
}
