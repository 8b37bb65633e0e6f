//! SDK adapter used by UI code: detection, init, authentication, payment
//! creation and server-side login verification.

use std::sync::Arc;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{
    AuthScope, Detection, HostEnvironment, InitParams, PaymentData, PaymentFlow, SdkError,
    WalletSdk, detect, normalize_amount,
};
use crate::config::SDK_VERSION;
use crate::domain::{AuthResult, PiPayment, PiUser};

const DEFAULT_VERIFY_ERROR: &str = "Failed to verify Pi login on the server.";

/// Adapter configuration.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// App id passed to `init`.
    pub app_id: Option<String>,
    /// Whether to target the sandbox.
    pub sandbox: bool,
    /// Base URL of the gateway (e.g. `https://app.example.com` or
    /// `https://host/app`). Treated as a directory.
    pub server_url: Url,
}

/// Outcome of [`SdkAdapter::authenticate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Authentication {
    /// Token and user.
    pub auth_result: AuthResult,
    /// A payment left incomplete by a previous session; the app should
    /// complete or cancel it server-side.
    pub incomplete_payment: Option<PiPayment>,
}

/// Server-verified user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedUser {
    /// User as returned by the platform's identity endpoint.
    pub user: PiUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyBody<'a> {
    auth_result: &'a AuthResult,
}

/// Typed front-end over a [`WalletSdk`].
#[derive(Debug, Clone)]
pub struct SdkAdapter {
    detection: Detection,
    init_params: InitParams,
    http: reqwest::Client,
    server_url: Url,
}

impl SdkAdapter {
    /// Detects the SDK in `host` and prepares the adapter.
    #[must_use]
    pub fn new(host: &HostEnvironment, config: AdapterConfig) -> Self {
        Self {
            detection: detect(host),
            init_params: InitParams {
                version: SDK_VERSION.to_string(),
                app_id: config.app_id,
                sandbox: config.sandbox,
            },
            http: reqwest::Client::new(),
            server_url: as_directory(config.server_url),
        }
    }

    /// The detection result captured at construction.
    #[must_use]
    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Calls the SDK's `init` if an SDK is present. Returns whether it
    /// did. Safe to call repeatedly.
    pub fn initialize(&self) -> bool {
        let Some(sdk) = self.detection.sdk.as_ref() else {
            return false;
        };
        sdk.init(&self.init_params);
        tracing::debug!(version = %self.init_params.version, sandbox = self.init_params.sandbox, "wallet sdk initialized");
        true
    }

    fn ensure_sdk(&self) -> Result<&Arc<dyn WalletSdk>, SdkError> {
        match (&self.detection.sdk, self.detection.is_inside_host_browser) {
            (Some(sdk), _) => Ok(sdk),
            (None, true) => Err(SdkError::StillLoading),
            (None, false) => Err(SdkError::NotDetected),
        }
    }

    /// Authenticates with the `username` and `payments` scopes.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::NotDetected`] / [`SdkError::StillLoading`] if
    /// no SDK is present, or the SDK's own error.
    pub async fn authenticate(&self) -> Result<Authentication, SdkError> {
        let sdk = self.ensure_sdk()?;
        let auth = sdk
            .authenticate(&[AuthScope::Username, AuthScope::Payments])
            .await?;
        if let Some(payment) = &auth.incomplete_payment {
            tracing::info!(payment_id = %payment.identifier, "incomplete payment found at sign-in");
        }
        Ok(Authentication {
            auth_result: auth.auth_result,
            incomplete_payment: auth.incomplete_payment,
        })
    }

    /// Creates a payment and returns its flow.
    ///
    /// A non-finite or non-positive `amount` is replaced with
    /// [`super::MIN_PAYMENT_AMOUNT`]. Without `metadata` the payment is
    /// tagged `{"testPayment": true}`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::NotDetected`] / [`SdkError::StillLoading`] if
    /// no SDK is present, or the SDK's own error.
    pub async fn create_payment(
        &self,
        amount: f64,
        memo: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<PaymentFlow, SdkError> {
        let sdk = self.ensure_sdk()?;
        let data = PaymentData {
            amount: normalize_amount(amount),
            memo: memo.to_string(),
            metadata: metadata.unwrap_or_else(|| serde_json::json!({ "testPayment": true })),
        };
        let session = sdk.create_payment(data).await?;
        tracing::info!(payment_id = %session.payment.identifier, "payment created");
        Ok(PaymentFlow::new(session))
    }

    /// Asks the gateway to verify `auth_result` against the platform.
    ///
    /// # Errors
    ///
    /// - [`SdkError::Verification`] with the server's message when the
    ///   server refuses (e.g. key not configured, token rejected).
    /// - [`SdkError::MissingUser`] if the reply has no user.
    /// - [`SdkError::Http`] on transport failure.
    pub async fn verify_auth(&self, auth_result: &AuthResult) -> Result<VerifiedUser, SdkError> {
        let url = self
            .server_url
            .join("api/pi/verify")
            .map_err(|e| SdkError::InvalidResponse(e.to_string()))?;
        let response = self
            .http
            .post(url)
            .json(&VerifyBody { auth_result })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let payload: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            return Err(SdkError::Verification(verify_error_message(&payload)));
        }

        match payload.get("user") {
            None | Some(serde_json::Value::Null) => Err(SdkError::MissingUser),
            Some(_) => serde_json::from_value(payload)
                .map_err(|e| SdkError::InvalidResponse(e.to_string())),
        }
    }
}

/// Appends a trailing slash so relative joins keep a mount path such as
/// `https://host/app`.
fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Builds `"<message>: <details>"` from a gateway error body, falling back
/// to a generic message.
fn verify_error_message(payload: &serde_json::Value) -> String {
    let error = payload.get("error");
    let message = error
        .and_then(|e| e.get("message").and_then(|m| m.as_str()).or_else(|| e.as_str()))
        .filter(|m| !m.is_empty());
    let details = payload
        .get("details")
        .or_else(|| error.and_then(|e| e.get("details")))
        .and_then(|d| d.as_str())
        .filter(|d| !d.is_empty());

    match (message, details) {
        (Some(m), Some(d)) => format!("{m}: {d}"),
        (Some(m), None) => m.to_string(),
        (None, _) => DEFAULT_VERIFY_ERROR.to_string(),
    }
}
