//! Payment lifecycle proxy: validates a payment action and forwards it
//! to the upstream Pi payments API.

use std::str::FromStr;

use crate::config::ApiKey;
use crate::error::GatewayError;
use crate::service::pi_client::{PaymentEndpoint, PiApiClient, ProxyReply};

/// Action accepted by the payment proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    /// Server-side approval of a payment.
    Approve,
    /// Server-side completion with an optional blockchain txid.
    Complete,
    /// Server-side cancellation.
    Cancel,
    /// Engagement ping from the UI, logged only.
    Engage,
    /// Liveness no-op.
    Ping,
}

impl PaymentAction {
    /// Upstream endpoint for actions that are forwarded.
    #[must_use]
    pub const fn endpoint(&self) -> Option<PaymentEndpoint> {
        match self {
            Self::Approve => Some(PaymentEndpoint::Approve),
            Self::Complete => Some(PaymentEndpoint::Complete),
            Self::Cancel => Some(PaymentEndpoint::Cancel),
            Self::Engage | Self::Ping => None,
        }
    }
}

impl FromStr for PaymentAction {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            "engage" => Ok(Self::Engage),
            "ping" => Ok(Self::Ping),
            _ => Err(GatewayError::InvalidRequest("Invalid action".to_string())),
        }
    }
}

/// A payment action request after JSON decoding.
#[derive(Debug, Clone, Default)]
pub struct ActionCommand {
    /// Raw action name.
    pub action: Option<String>,
    /// Payment identifier.
    pub payment_id: Option<String>,
    /// Blockchain transaction id, for `complete`.
    pub txid: Option<String>,
    /// User uid, for `engage`.
    pub uid: Option<String>,
}

/// Orchestrates payment actions against the upstream API.
///
/// Stateless apart from configuration. With recovery enabled:
/// - an "ongoing payment" failure triggers one best-effort cancel of the
///   conflicting payment before the original reply is returned;
/// - a `complete` that fails with "already completed" is reported as
///   success.
#[derive(Debug, Clone)]
pub struct PaymentProxy {
    client: PiApiClient,
    api_key: Option<ApiKey>,
    recovery: bool,
}

impl PaymentProxy {
    /// Creates a new proxy.
    #[must_use]
    pub fn new(client: PiApiClient, api_key: Option<ApiKey>, recovery: bool) -> Self {
        Self {
            client,
            api_key,
            recovery,
        }
    }

    /// Validates and executes a payment action.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotConfigured`] if the API key is missing.
    /// - [`GatewayError::InvalidRequest`] if the action is missing or
    ///   unknown, or a forwarded action has no `paymentId`.
    /// - [`GatewayError::Upstream`] on transport failure.
    pub async fn handle(&self, command: ActionCommand) -> Result<ProxyReply, GatewayError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or(GatewayError::NotConfigured("PI_API_KEY"))?;

        let action: PaymentAction = command
            .action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| GatewayError::InvalidRequest("missing action".to_string()))?
            .parse()?;

        let Some(endpoint) = action.endpoint() else {
            return Ok(self.local_action(action, command.uid.as_deref()));
        };

        let payment_id = command
            .payment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::InvalidRequest("missing paymentId".to_string()))?;

        let txid = command
            .txid
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let reply = self
            .client
            .payment_action(key, payment_id, endpoint, txid)
            .await?;

        if reply.is_success() || !self.recovery {
            return Ok(reply);
        }
        Ok(self.recover(key, endpoint, payment_id, reply).await)
    }

    fn local_action(&self, action: PaymentAction, uid: Option<&str>) -> ProxyReply {
        match action {
            PaymentAction::Engage => {
                tracing::info!(uid = uid.unwrap_or_default(), "user engaged");
                ProxyReply::ok(serde_json::json!({ "success": true }))
            }
            _ => ProxyReply::ok(serde_json::json!({ "success": true, "action": "ping" })),
        }
    }

    async fn recover(
        &self,
        key: &ApiKey,
        endpoint: PaymentEndpoint,
        payment_id: &str,
        reply: ProxyReply,
    ) -> ProxyReply {
        let error_text = reply.error_text();

        if endpoint == PaymentEndpoint::Complete && is_already_completed(&error_text) {
            tracing::info!(payment_id, "payment already completed upstream; reporting success");
            let payment = reply.body.get("payment").cloned().unwrap_or_default();
            return ProxyReply::ok(serde_json::json!({
                "success": true,
                "alreadyCompleted": true,
                "paymentId": payment_id,
                "payment": payment,
            }));
        }

        if endpoint != PaymentEndpoint::Cancel && is_ongoing_payment(&error_text) {
            let conflicting = reply
                .body
                .get("payment")
                .and_then(|p| p.get("identifier"))
                .and_then(|v| v.as_str())
                .unwrap_or(payment_id);

            match self
                .client
                .payment_action(key, conflicting, PaymentEndpoint::Cancel, None)
                .await
            {
                Ok(cancel) if cancel.is_success() => {
                    tracing::warn!(payment_id, conflicting, "cancelled ongoing payment");
                }
                Ok(cancel) => {
                    tracing::warn!(
                        payment_id,
                        conflicting,
                        status = cancel.status.as_u16(),
                        "auto-cancel of ongoing payment rejected"
                    );
                }
                Err(e) => {
                    tracing::warn!(payment_id, conflicting, error = %e, "auto-cancel of ongoing payment failed");
                }
            }
        }

        reply
    }
}

fn is_already_completed(error_text: &str) -> bool {
    error_text.contains("already_completed") || error_text.contains("already completed")
}

fn is_ongoing_payment(error_text: &str) -> bool {
    error_text.contains("ongoing_payment") || error_text.contains("ongoing payment")
}
