//! End-to-end tests: the gateway served over HTTP against a fake upstream
//! Pi API.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod support;

use reqwest::StatusCode;
use serde_json::{Value, json};

use pi_gateway::config::{FALLBACK_VALIDATION_KEY, GatewayConfig};
use pi_gateway::domain::{AuthResult, PiUser};
use pi_gateway::sdk::{AdapterConfig, HostEnvironment, SdkAdapter, SdkError};

use support::{
    EMPTY_USER_TOKEN, GOOD_TOKEN, ONGOING_ID, SLOW_ID, STALE_ID, UNKNOWN_ID, spawn_gateway,
    spawn_stack, spawn_upstream, spawn_verify_stub,
};

async fn post_json(url: &str, body: &Value) -> (StatusCode, Value) {
    let Ok(response) = reqwest::Client::new().post(url).json(body).send().await else {
        panic!("POST {url}");
    };
    let status = response.status();
    let json = response.json::<Value>().await.unwrap_or_default();
    (status, json)
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let Ok(response) = reqwest::get(url).await else {
        panic!("GET {url}");
    };
    let status = response.status();
    let json = response.json::<Value>().await.unwrap_or_default();
    (status, json)
}

#[tokio::test]
async fn approve_is_forwarded_with_key_header() {
    let (fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "approve", "paymentId": "pay-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identifier"], "pay-1");
    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].action, "approve");
    assert_eq!(calls[0].payment_id, "pay-1");
    assert_eq!(calls[0].authorization.as_deref(), Some("Key secret"));
}

#[tokio::test]
async fn upstream_errors_are_forwarded_verbatim() {
    let (_fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "approve", "paymentId": UNKNOWN_ID }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "payment_not_found" }));
}

#[tokio::test]
async fn complete_sends_txid_and_is_idempotent() {
    let (fake, gateway) = spawn_stack(Some("secret")).await;
    let request = json!({ "action": "complete", "paymentId": "pay-2", "txid": "tx-1" });

    let (first, _) = post_json(&format!("{gateway}/api/pi"), &request).await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = post_json(&format!("{gateway}/api/pi"), &request).await;
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["alreadyCompleted"], true);
    assert_eq!(body["paymentId"], "pay-2");

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body, json!({ "txid": "tx-1" }));
}

#[tokio::test]
async fn complete_without_txid_sends_null() {
    let (fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, _) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "complete", "paymentId": "pay-empty", "txid": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "complete", "paymentId": "pay-none" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let bodies: Vec<_> = fake.calls().into_iter().map(|c| (c.payment_id, c.body)).collect();
    assert_eq!(
        bodies,
        vec![
            ("pay-empty".to_string(), json!({ "txid": null })),
            ("pay-none".to_string(), json!({ "txid": null })),
        ]
    );
}

#[tokio::test]
async fn slow_upstream_hits_request_timeout() {
    let (_fake, upstream) = spawn_upstream().await;
    let mut config = GatewayConfig::for_upstream(&upstream).with_api_key("secret");
    config.request_timeout_secs = 1;
    let gateway = spawn_gateway(config).await;

    let (status, _) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "approve", "paymentId": SLOW_ID }),
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn recovery_can_be_disabled() {
    let (fake, upstream) = spawn_upstream().await;
    let mut config = GatewayConfig::for_upstream(&upstream).with_api_key("secret");
    config.payment_recovery = false;
    let gateway = spawn_gateway(config).await;
    let request = json!({ "action": "complete", "paymentId": "pay-3", "txid": "tx-1" });

    let _ = post_json(&format!("{gateway}/api/pi"), &request).await;
    let (status, body) = post_json(&format!("{gateway}/api/pi"), &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "already_completed");

    let (status, _) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "approve", "paymentId": ONGOING_ID }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(fake.calls().iter().all(|c| c.action != "cancel"));
}

#[tokio::test]
async fn ongoing_payment_is_cancelled_and_original_reply_returned() {
    let (fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "approve", "paymentId": ONGOING_ID }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ongoing_payment_found");
    let cancels: Vec<_> = fake
        .calls()
        .into_iter()
        .filter(|c| c.action == "cancel")
        .collect();
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].payment_id, STALE_ID);
}

#[tokio::test]
async fn missing_key_is_reported_without_calling_upstream() {
    let (fake, gateway) = spawn_stack(None).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/pi"),
        &json!({ "action": "approve", "paymentId": "pay-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "PI_API_KEY not configured");
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (_fake, gateway) = spawn_stack(Some("secret")).await;

    let Ok(response) = reqwest::Client::new()
        .post(format!("{gateway}/api/pi"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
    else {
        panic!("POST /api/pi");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_and_ping() {
    let (_fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, body) = get_json(&format!("{gateway}/api/pi")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Pi payments API OK");

    let (status, body) = post_json(&format!("{gateway}/api/pi"), &json!({ "action": "ping" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn mock_payment_lifecycle() {
    let (_fake, gateway) = spawn_stack(None).await;
    let url = format!("{gateway}/api/pi/mock-payments");

    let (status, body) = post_json(
        &url,
        &json!({ "identifier": "pay-1", "action": "init", "amount": 0.5, "memo": "test" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["status"], "pending_server_approval");
    assert_eq!(body["payment"]["amount"], 0.5);
    assert_eq!(body["payment"]["history"].as_array().map(Vec::len), Some(1));

    let (_, body) = post_json(&url, &json!({ "identifier": "pay-1", "action": "approve" })).await;
    assert_eq!(body["payment"]["status"], "approved");
    assert_eq!(body["payment"]["memo"], "test");
    assert_eq!(body["payment"]["history"].as_array().map(Vec::len), Some(2));

    let (_, body) = get_json(&url).await;
    assert_eq!(body["payments"].as_array().map(Vec::len), Some(1));

    let (status, body) = post_json(&url, &json!({ "identifier": "pay-1", "action": "reset" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, body) = get_json(&url).await;
    assert_eq!(body, json!({ "payments": [] }));
}

#[tokio::test]
async fn mock_payment_rejects_bad_input() {
    let (_fake, gateway) = spawn_stack(None).await;
    let url = format!("{gateway}/api/pi/mock-payments");

    let (status, _) = post_json(&url, &json!({ "action": "init" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&url, &json!({ "identifier": "pay-1", "action": "refund" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_key_falls_back_with_text_content_type() {
    let (_fake, gateway) = spawn_stack(None).await;

    let Ok(response) = reqwest::get(format!("{gateway}/.well-known/pi-validation.txt")).await else {
        panic!("GET validation key");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    let text = response.text().await.unwrap_or_default();
    assert_eq!(text, format!("{FALLBACK_VALIDATION_KEY}\n"));
}

#[tokio::test]
async fn verify_returns_upstream_user() {
    let (fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/pi/verify"),
        &json!({ "authResult": { "accessToken": GOOD_TOKEN } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "pioneer");
    assert_eq!(fake.calls()[0].authorization.as_deref(), Some("Key secret"));
}

#[tokio::test]
async fn verify_rejects_bad_token_and_missing_payload() {
    let (_fake, gateway) = spawn_stack(Some("secret")).await;
    let url = format!("{gateway}/api/pi/verify");

    let (status, body) = post_json(&url, &json!({ "authResult": { "accessToken": "bad" } })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["details"], "invalid access token");

    let (status, _) = post_json(&url, &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_without_upstream_user_is_server_error() {
    let (_fake, gateway) = spawn_stack(Some("secret")).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/pi/verify"),
        &json!({ "authResult": { "accessToken": EMPTY_USER_TOKEN } }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Internal Server Error");
    assert!(body.get("user").is_none());
}

fn auth_result(token: &str) -> AuthResult {
    AuthResult {
        access_token: token.to_string(),
        user: PiUser {
            uid: "uid-1".to_string(),
            username: "pioneer".to_string(),
            roles: Vec::new(),
        },
    }
}

fn adapter(gateway: &str) -> SdkAdapter {
    let Ok(server_url) = reqwest::Url::parse(&format!("{gateway}/")) else {
        panic!("gateway url");
    };
    SdkAdapter::new(
        &HostEnvironment::default(),
        AdapterConfig {
            app_id: None,
            sandbox: true,
            server_url,
        },
    )
}

#[tokio::test]
async fn sdk_adapter_verifies_login_against_gateway() {
    let (_fake, gateway) = spawn_stack(Some("secret")).await;
    let adapter = adapter(&gateway);

    let Ok(verified) = adapter.verify_auth(&auth_result(GOOD_TOKEN)).await else {
        panic!("verification should succeed");
    };
    assert_eq!(verified.user.uid, "uid-1");

    let Err(SdkError::Verification(message)) = adapter.verify_auth(&auth_result("bad")).await else {
        panic!("bad token should be refused");
    };
    assert_eq!(message, "Pi authentication verification failed.: invalid access token");
}

#[tokio::test]
async fn sdk_adapter_surfaces_missing_key() {
    let (_fake, gateway) = spawn_stack(None).await;

    let Err(SdkError::Verification(message)) =
        adapter(&gateway).verify_auth(&auth_result(GOOD_TOKEN)).await
    else {
        panic!("verification should fail without a key");
    };
    assert_eq!(message, "PI_API_KEY not configured");
}

#[tokio::test]
async fn sdk_adapter_requires_user_in_reply() {
    for reply in [json!({}), json!({ "user": null })] {
        let server = spawn_verify_stub(reply.clone()).await;
        let result = adapter(&server).verify_auth(&auth_result(GOOD_TOKEN)).await;
        assert!(
            matches!(result, Err(SdkError::MissingUser)),
            "reply {reply} gave {result:?}"
        );
    }
}

#[tokio::test]
async fn sdk_adapter_rejects_malformed_user() {
    let server = spawn_verify_stub(json!({ "user": 42 })).await;
    let result = adapter(&server).verify_auth(&auth_result(GOOD_TOKEN)).await;
    assert!(matches!(result, Err(SdkError::InvalidResponse(_))));
}
