//! REST endpoint handlers organized by resource.

pub mod mock_payments;
pub mod payments;
pub mod system;
pub mod verify;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(payments::routes())
        .merge(mock_payments::routes())
        .merge(verify::routes())
        .route("/pi/sdk-config", get(system::sdk_config_handler))
}
