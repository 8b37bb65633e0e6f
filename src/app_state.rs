//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::{ConfigError, GatewayConfig};
use crate::persistence::PaymentStore;
use crate::service::{IdentityService, MockPaymentService, PaymentProxy, PiApiClient};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Payment lifecycle proxy.
    pub payments: Arc<PaymentProxy>,
    /// Access token verification.
    pub identity: Arc<IdentityService>,
    /// Reviewer-facing mock payment service.
    pub mock_payments: Arc<MockPaymentService>,
    /// Loaded configuration.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Wires the service layer from `config` over the given mock store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the upstream base URL is
    /// invalid.
    pub fn new(config: GatewayConfig, store: Arc<dyn PaymentStore>) -> Result<Self, ConfigError> {
        let client = PiApiClient::new(&config.pi_api_base_url)?;
        let payments = PaymentProxy::new(
            client.clone(),
            config.pi_api_key.clone(),
            config.payment_recovery,
        );
        let identity = IdentityService::new(client, config.pi_api_key.clone());

        Ok(Self {
            payments: Arc::new(payments),
            identity: Arc::new(identity),
            mock_payments: Arc::new(MockPaymentService::new(store)),
            config: Arc::new(config),
        })
    }
}
