//! Mock payment record used to walk reviewers through the payment
//! callback sequence without a live backend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a mock payment.
///
/// Mirrors the states a production payment processor would move a
/// payment through. The mock store never checks transition legality:
/// any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MockPaymentStatus {
    /// Created client-side, not yet reported to the server.
    Initialized,
    /// Waiting for the server to approve the payment.
    PendingServerApproval,
    /// Approved by the server.
    Approved,
    /// Blockchain transaction submitted, waiting for server completion.
    ReadyForCompletion,
    /// Completed by the server.
    Completed,
    /// Cancelled by the user or the server.
    Cancelled,
    /// The payment failed.
    Error,
}

impl MockPaymentStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::PendingServerApproval => "pending_server_approval",
            Self::Approved => "approved",
            Self::ReadyForCompletion => "ready_for_completion",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for MockPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mock payment status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for MockPaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialized" => Ok(Self::Initialized),
            "pending_server_approval" => Ok(Self::PendingServerApproval),
            "approved" => Ok(Self::Approved),
            "ready_for_completion" => Ok(Self::ReadyForCompletion),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "error" => Ok(Self::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A mock payment as stored by the mock payment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MockPayment {
    /// Caller-supplied identifier, mirrors the wallet SDK's payment id.
    pub identifier: String,
    /// Current status.
    pub status: MockPaymentStatus,
    /// Payment amount, set at `init` and carried forward afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Payment memo, set at `init` and carried forward afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Timestamp of the last transition.
    pub updated_at: DateTime<Utc>,
    /// Append-only `"<status> @ <timestamp>"` lines, oldest first.
    pub history: Vec<String>,
}

impl MockPayment {
    /// Builds the record that results from applying `status` to the
    /// `previous` record (if any) at time `now`.
    ///
    /// `amount` and `memo` fall back to the previous values when `None`.
    /// A history line is always appended.
    #[must_use]
    pub fn transition(
        previous: Option<Self>,
        identifier: &str,
        status: MockPaymentStatus,
        amount: Option<f64>,
        memo: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let (prev_amount, prev_memo, mut history) = match previous {
            Some(p) => (p.amount, p.memo, p.history),
            None => (None, None, Vec::with_capacity(1)),
        };
        history.push(history_line(status, now));

        Self {
            identifier: identifier.to_string(),
            status,
            amount: amount.or(prev_amount),
            memo: memo.or(prev_memo),
            updated_at: now,
            history,
        }
    }
}

/// Formats a history entry: `"<status> @ <RFC 3339 timestamp>"`.
#[must_use]
pub fn history_line(status: MockPaymentStatus, at: DateTime<Utc>) -> String {
    format!("{status} @ {}", at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
