//! Mock payment service: maps reviewer actions onto the payment store.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::{MockPayment, MockPaymentStatus};
use crate::error::GatewayError;
use crate::persistence::PaymentStore;

/// Action accepted by the mock payments endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAction {
    /// Create (or re-create) the payment as pending server approval.
    Init,
    /// Mark approved.
    Approve,
    /// Mark completed.
    Complete,
    /// Mark cancelled.
    Cancel,
    /// Remove the record.
    Reset,
}

impl MockAction {
    /// Status written by the action; `None` for [`MockAction::Reset`].
    #[must_use]
    pub const fn target_status(&self) -> Option<MockPaymentStatus> {
        match self {
            Self::Init => Some(MockPaymentStatus::PendingServerApproval),
            Self::Approve => Some(MockPaymentStatus::Approved),
            Self::Complete => Some(MockPaymentStatus::Completed),
            Self::Cancel => Some(MockPaymentStatus::Cancelled),
            Self::Reset => None,
        }
    }
}

impl FromStr for MockAction {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(Self::Init),
            "approve" => Ok(Self::Approve),
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            "reset" => Ok(Self::Reset),
            _ => Err(GatewayError::InvalidRequest("Unsupported action.".to_string())),
        }
    }
}

/// Result of applying a [`MockAction`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// The record after the transition.
    Payment(MockPayment),
    /// The record was removed.
    Reset,
}

/// Applies mock payment actions to an injected [`PaymentStore`].
#[derive(Debug, Clone)]
pub struct MockPaymentService {
    store: Arc<dyn PaymentStore>,
}

impl MockPaymentService {
    /// Creates a new service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn PaymentStore> {
        &self.store
    }

    /// Applies `action` (default `init`) to `identifier`.
    ///
    /// `amount` and `memo` are only recorded for `init`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a missing identifier
    /// or unknown action, and [`GatewayError::Store`] on backend failure.
    pub async fn apply(
        &self,
        identifier: Option<&str>,
        action: Option<&str>,
        amount: Option<f64>,
        memo: Option<String>,
    ) -> Result<MockOutcome, GatewayError> {
        let identifier = identifier
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::InvalidRequest("Missing payment identifier.".to_string()))?;
        let action = action.map_or(Ok(MockAction::Init), str::parse::<MockAction>)?;

        let Some(status) = action.target_status() else {
            self.store.delete(identifier).await?;
            tracing::debug!(identifier, "mock payment reset");
            return Ok(MockOutcome::Reset);
        };

        let (amount, memo) = if action == MockAction::Init {
            (amount, memo)
        } else {
            (None, None)
        };
        let payment = self.store.upsert(identifier, status, amount, memo).await?;
        tracing::debug!(identifier, %status, "mock payment updated");
        Ok(MockOutcome::Payment(payment))
    }

    /// Returns every mock payment in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] on backend failure.
    pub async fn list(&self) -> Result<Vec<MockPayment>, GatewayError> {
        Ok(self.store.list().await?)
    }
}
