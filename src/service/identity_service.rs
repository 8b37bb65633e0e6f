//! Server-side verification of wallet SDK access tokens.

use crate::config::ApiKey;
use crate::error::GatewayError;
use crate::service::pi_client::PiApiClient;

/// Verifies access tokens against the upstream `/me` endpoint.
#[derive(Debug, Clone)]
pub struct IdentityService {
    client: PiApiClient,
    api_key: Option<ApiKey>,
}

impl IdentityService {
    /// Creates a new identity service.
    #[must_use]
    pub fn new(client: PiApiClient, api_key: Option<ApiKey>) -> Self {
        Self { client, api_key }
    }

    /// Verifies `access_token` and returns the upstream user payload.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] if the token is empty.
    /// - [`GatewayError::NotConfigured`] if the API key is missing.
    /// - [`GatewayError::VerificationFailed`] if upstream rejects the token.
    /// - [`GatewayError::Upstream`] on transport failure.
    pub async fn verify(&self, access_token: Option<&str>) -> Result<serde_json::Value, GatewayError> {
        let access_token = access_token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            GatewayError::InvalidRequest(
                "Missing Pi authentication payload (accessToken).".to_string(),
            )
        })?;
        let key = self
            .api_key
            .as_ref()
            .ok_or(GatewayError::NotConfigured("PI_API_KEY"))?;

        let reply = self.client.me(key, access_token).await?;
        if !reply.is_success() {
            let details = match reply.body {
                serde_json::Value::Object(ref map) if map.contains_key("raw") => map
                    .get("raw")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                ref other => other.to_string(),
            };
            tracing::warn!(status = reply.status.as_u16(), "pi auth verification rejected");
            return Err(GatewayError::VerificationFailed { details });
        }

        if reply.body.is_null() || reply.body.get("raw").is_some() {
            tracing::error!(status = reply.status.as_u16(), "pi /me returned no user payload");
            return Err(GatewayError::Internal(
                "Unexpected server error during Pi verification.".to_string(),
            ));
        }

        Ok(reply.body)
    }
}
