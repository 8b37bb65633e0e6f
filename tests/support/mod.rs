//! Shared harness: a fake upstream Pi API and a gateway instance, both
//! served on ephemeral localhost ports.

#![allow(dead_code, clippy::panic)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use pi_gateway::api::build_app;
use pi_gateway::app_state::AppState;
use pi_gateway::config::GatewayConfig;
use pi_gateway::persistence::InMemoryPaymentStore;

/// Payment id the fake upstream reports as blocked by an ongoing payment.
pub const ONGOING_ID: &str = "blocked-1";
/// Id of the stale payment the fake upstream reports as ongoing.
pub const STALE_ID: &str = "stale-1";
/// Payment id the fake upstream does not know.
pub const UNKNOWN_ID: &str = "unknown-1";
/// Payment id whose approval the fake upstream answers after
/// [`SLOW_DELAY`].
pub const SLOW_ID: &str = "slow-1";
/// Delay applied to [`SLOW_ID`].
pub const SLOW_DELAY: Duration = Duration::from_secs(3);
/// Access token accepted by the fake `/me`.
pub const GOOD_TOKEN: &str = "good-token";
/// Access token for which the fake `/me` answers 200 with an empty body.
pub const EMPTY_USER_TOKEN: &str = "empty-user-token";

/// One request observed by the fake upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    /// `approve`, `complete`, `cancel` or `me`.
    pub action: String,
    /// Payment id (empty for `me`).
    pub payment_id: String,
    /// `Authorization` header.
    pub authorization: Option<String>,
    /// JSON body, `Null` when none was sent.
    pub body: serde_json::Value,
}

/// Shared state of the fake upstream.
#[derive(Debug, Clone, Default)]
pub struct FakeUpstream {
    calls: Arc<Mutex<Vec<UpstreamCall>>>,
    completed: Arc<Mutex<HashSet<String>>>,
}

impl FakeUpstream {
    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> Vec<UpstreamCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, action: &str, payment_id: &str, headers: &HeaderMap, body: serde_json::Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(UpstreamCall {
                action: action.to_string(),
                payment_id: payment_id.to_string(),
                authorization,
                body,
            });
        }
    }
}

fn parse_body(raw: &str) -> serde_json::Value {
    if raw.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
    }
}

async fn approve(
    State(fake): State<FakeUpstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    fake.record("approve", &id, &headers, parse_body(&body));
    if id == SLOW_ID {
        tokio::time::sleep(SLOW_DELAY).await;
    }
    match id.as_str() {
        ONGOING_ID => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "ongoing_payment_found",
                "error_message": "A pending payment needs to be handled.",
                "payment": { "identifier": STALE_ID },
            })),
        )
            .into_response(),
        UNKNOWN_ID => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "payment_not_found" })),
        )
            .into_response(),
        _ => Json(serde_json::json!({
            "identifier": id,
            "status": { "developer_approved": true },
        }))
        .into_response(),
    }
}

async fn complete(
    State(fake): State<FakeUpstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let body = parse_body(&body);
    fake.record("complete", &id, &headers, body.clone());
    let first = fake
        .completed
        .lock()
        .map(|mut done| done.insert(id.clone()))
        .unwrap_or(false);
    if first {
        Json(serde_json::json!({
            "identifier": id,
            "transaction": { "txid": body.get("txid").cloned().unwrap_or_default() },
            "status": { "developer_completed": true },
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "already_completed",
                "error_message": "This payment has already been completed.",
                "payment": { "identifier": id },
            })),
        )
            .into_response()
    }
}

async fn cancel(
    State(fake): State<FakeUpstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    fake.record("cancel", &id, &headers, parse_body(&body));
    Json(serde_json::json!({ "identifier": id, "status": { "cancelled": true } })).into_response()
}

async fn me(State(fake): State<FakeUpstream>, headers: HeaderMap) -> Response {
    fake.record("me", "", &headers, serde_json::Value::Null);
    let token = headers.get("x-auth-token").and_then(|v| v.to_str().ok());
    if token == Some(GOOD_TOKEN) {
        Json(serde_json::json!({ "uid": "uid-1", "username": "pioneer" })).into_response()
    } else if token == Some(EMPTY_USER_TOKEN) {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid access token").into_response()
    }
}

async fn serve(router: Router) -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Starts the fake upstream and returns its `/v2` base URL.
pub async fn spawn_upstream() -> (FakeUpstream, String) {
    let fake = FakeUpstream::default();
    let router = Router::new()
        .route("/v2/payments/{id}/approve", post(approve))
        .route("/v2/payments/{id}/complete", post(complete))
        .route("/v2/payments/{id}/cancel", post(cancel))
        .route("/v2/me", get(me))
        .with_state(fake.clone());
    let addr = serve(router).await;
    (fake, format!("http://{addr}/v2"))
}

/// Starts a gateway for `config` and returns its base URL.
pub async fn spawn_gateway(config: GatewayConfig) -> String {
    let Ok(state) = AppState::new(config, Arc::new(InMemoryPaymentStore::new())) else {
        panic!("valid config");
    };
    let addr = serve(build_app(state)).await;
    format!("http://{addr}")
}

/// Fake upstream plus a gateway configured with `api_key`.
pub async fn spawn_stack(api_key: Option<&str>) -> (FakeUpstream, String) {
    let (fake, upstream) = spawn_upstream().await;
    let mut config = GatewayConfig::for_upstream(&upstream);
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    (fake, spawn_gateway(config).await)
}

/// Serves a gateway stand-in whose verify endpoint always answers 200
/// with `body`, and returns its base URL.
pub async fn spawn_verify_stub(body: serde_json::Value) -> String {
    let router = Router::new().route(
        "/api/pi/verify",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    let addr = serve(router).await;
    format!("http://{addr}")
}
