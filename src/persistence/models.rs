//! Database row model for the `mock_payments` table.

use chrono::{DateTime, Utc};
use sqlx::types::Json;

use super::StoreError;
use crate::domain::MockPayment;

/// Column tuple selected from `mock_payments`:
/// `(identifier, status, amount, memo, updated_at, history)`.
pub type MockPaymentTuple = (
    String,
    String,
    Option<f64>,
    Option<String>,
    DateTime<Utc>,
    Json<Vec<String>>,
);

/// A stored row from the `mock_payments` table.
#[derive(Debug, Clone)]
pub struct MockPaymentRow {
    /// Primary key.
    pub identifier: String,
    /// Status wire name.
    pub status: String,
    /// Optional amount.
    pub amount: Option<f64>,
    /// Optional memo.
    pub memo: Option<String>,
    /// Last transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// JSONB array of history lines.
    pub history: Vec<String>,
}

impl From<MockPaymentTuple> for MockPaymentRow {
    fn from((identifier, status, amount, memo, updated_at, history): MockPaymentTuple) -> Self {
        Self {
            identifier,
            status,
            amount,
            memo,
            updated_at,
            history: history.0,
        }
    }
}

impl TryFrom<MockPaymentRow> for MockPayment {
    type Error = StoreError;

    fn try_from(row: MockPaymentRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| StoreError::Corrupt {
            identifier: row.identifier.clone(),
            reason: format!("{e}"),
        })?;
        Ok(Self {
            identifier: row.identifier,
            status,
            amount: row.amount,
            memo: row.memo,
            updated_at: row.updated_at,
            history: row.history,
        })
    }
}
