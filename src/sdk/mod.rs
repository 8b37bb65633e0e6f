//! Client-side wallet SDK adapter.
//!
//! The wallet SDK is abstracted behind [`WalletSdk`]. Instead of nested
//! callbacks, payment progress arrives as [`PaymentEvent`]s on a channel
//! and drives a [`PaymentFlow`] state machine:
//!
//! ```text
//! Idle ──► PendingApproval ──► PendingCompletion ──► Completed
//!   │             │                    │
//!   └─────────────┴────────────────────┴──► Cancelled | Failed
//! ```
//!
//! The gateway never enforces this machine; it only records transitions
//! reported by the SDK.

pub mod adapter;
pub mod flow;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::{AuthResult, PiPayment};

pub use adapter::{AdapterConfig, Authentication, SdkAdapter, VerifiedUser};
pub use flow::{FlowState, PaymentFlow};

/// Smallest amount sent when the caller passes a non-finite or
/// non-positive amount.
pub const MIN_PAYMENT_AMOUNT: f64 = 0.01;

/// User-agent marker of the Pi host browser.
const HOST_BROWSER_MARKER: &str = "pibrowser";

/// Errors raised by the SDK adapter.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// No SDK is installed in the host environment.
    #[error("Pi SDK not detected. Open the DApp inside Pi Browser.")]
    NotDetected,

    /// Running inside the host browser but the SDK has not loaded yet.
    #[error("Pi Browser is open but the SDK is still loading. Refresh or check your Pi session.")]
    StillLoading,

    /// The SDK itself reported a failure.
    #[error("Pi SDK error: {0}")]
    Sdk(String),

    /// The server refused to verify the login.
    #[error("{0}")]
    Verification(String),

    /// The server's verification reply had no user.
    #[error("Pi verification response did not include a user payload.")]
    MissingUser,

    /// The server reply could not be decoded.
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// Transport failure talking to the server.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Permission scope requested at authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScope {
    /// Access to the Pioneer's username.
    Username,
    /// Permission to create payments.
    Payments,
}

/// Parameters passed to the SDK's `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitParams {
    /// SDK protocol version.
    pub version: String,
    /// App id registered with the platform.
    pub app_id: Option<String>,
    /// Whether to target the sandbox.
    pub sandbox: bool,
}

/// Payment data handed to the SDK's payment creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentData {
    /// Amount in Pi. Always finite and positive.
    pub amount: f64,
    /// Memo shown to the user.
    pub memo: String,
    /// App-defined metadata.
    pub metadata: serde_json::Value,
}

/// Progress reported by the SDK for a payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// The payment was created and awaits server approval.
    ReadyForServerApproval(PiPayment),
    /// The user signed the transaction; the server should complete it.
    ReadyForServerCompletion {
        /// The payment.
        payment: PiPayment,
        /// Blockchain transaction id.
        txid: String,
    },
    /// The server completed the payment.
    Completed(PiPayment),
    /// The user or the platform cancelled the payment.
    Cancelled(Option<PiPayment>),
    /// The SDK reported an error.
    Failed {
        /// Error description.
        message: String,
        /// The payment, when known.
        payment: Option<PiPayment>,
    },
}

/// Result of [`WalletSdk::authenticate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SdkAuthentication {
    /// Token and user.
    pub auth_result: AuthResult,
    /// A payment left incomplete by a previous session, if the platform
    /// found one.
    pub incomplete_payment: Option<PiPayment>,
}

/// A payment created by the SDK plus its event stream.
#[derive(Debug)]
pub struct PaymentSession {
    /// The payment as initially reported.
    pub payment: PiPayment,
    /// Progress events, in order.
    pub events: mpsc::Receiver<PaymentEvent>,
}

/// Wallet SDK operations used by the adapter.
#[async_trait]
pub trait WalletSdk: Send + Sync + fmt::Debug {
    /// Initializes the SDK. Idempotent by SDK contract.
    fn init(&self, params: &InitParams);

    /// Authenticates the user with the requested scopes.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Sdk`] if the user declines or the SDK fails.
    async fn authenticate(&self, scopes: &[AuthScope]) -> Result<SdkAuthentication, SdkError>;

    /// Starts a payment.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Sdk`] if the SDK refuses to create it.
    async fn create_payment(&self, data: PaymentData) -> Result<PaymentSession, SdkError>;
}

/// What the adapter can see of its host: an installed SDK handle and the
/// browser user agent.
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    /// SDK handle, if the SDK script has loaded.
    pub sdk: Option<Arc<dyn WalletSdk>>,
    /// Browser user agent.
    pub user_agent: Option<String>,
}

/// Result of [`detect`].
#[derive(Debug, Clone)]
pub struct Detection {
    /// The SDK, if present.
    pub sdk: Option<Arc<dyn WalletSdk>>,
    /// Whether the user agent identifies the Pi host browser.
    pub is_inside_host_browser: bool,
}

/// Inspects the host environment. No side effects.
#[must_use]
pub fn detect(host: &HostEnvironment) -> Detection {
    let is_inside_host_browser = host
        .user_agent
        .as_deref()
        .is_some_and(|ua| ua.to_lowercase().contains(HOST_BROWSER_MARKER));
    Detection {
        sdk: host.sdk.as_ref().map(Arc::clone),
        is_inside_host_browser,
    }
}

/// Replaces a non-finite or non-positive amount with [`MIN_PAYMENT_AMOUNT`].
#[must_use]
pub fn normalize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        MIN_PAYMENT_AMOUNT
    }
}
