//! Client-observed payment state machine.

use tokio::sync::mpsc;

use super::{PaymentEvent, PaymentSession};
use crate::domain::PiPayment;

/// State of a payment as observed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// Created, no event received yet.
    Idle,
    /// Waiting for the server to approve.
    PendingApproval,
    /// Waiting for the server to complete.
    PendingCompletion,
    /// Completed. Terminal.
    Completed,
    /// Cancelled. Terminal.
    Cancelled,
    /// Failed. Terminal.
    Failed,
}

impl FlowState {
    /// Returns `true` for `Completed`, `Cancelled` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Tracks one payment through its SDK events.
///
/// Events received after a terminal state are ignored.
#[derive(Debug)]
pub struct PaymentFlow {
    payment: PiPayment,
    state: FlowState,
    txid: Option<String>,
    error: Option<String>,
    events: mpsc::Receiver<PaymentEvent>,
}

impl PaymentFlow {
    /// Starts tracking a freshly created payment.
    #[must_use]
    pub fn new(session: PaymentSession) -> Self {
        Self {
            payment: session.payment,
            state: FlowState::Idle,
            txid: None,
            error: None,
            events: session.events,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Latest payment snapshot reported by the SDK.
    #[must_use]
    pub fn payment(&self) -> &PiPayment {
        &self.payment
    }

    /// Blockchain txid, once the payment is ready for completion.
    #[must_use]
    pub fn txid(&self) -> Option<&str> {
        self.txid.as_deref()
    }

    /// Error message if the flow failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Applies one event and returns the resulting state.
    pub fn apply(&mut self, event: PaymentEvent) -> FlowState {
        if self.state.is_terminal() {
            tracing::debug!(state = ?self.state, ?event, "ignoring event after terminal state");
            return self.state;
        }

        self.state = match event {
            PaymentEvent::ReadyForServerApproval(payment) => {
                self.payment = payment;
                FlowState::PendingApproval
            }
            PaymentEvent::ReadyForServerCompletion { payment, txid } => {
                self.payment = payment;
                self.txid = Some(txid);
                FlowState::PendingCompletion
            }
            PaymentEvent::Completed(payment) => {
                self.payment = payment;
                FlowState::Completed
            }
            PaymentEvent::Cancelled(payment) => {
                if let Some(payment) = payment {
                    self.payment = payment;
                }
                FlowState::Cancelled
            }
            PaymentEvent::Failed { message, payment } => {
                if let Some(payment) = payment {
                    self.payment = payment;
                }
                self.error = Some(message);
                FlowState::Failed
            }
        };
        self.state
    }

    /// Waits for the next event and applies it.
    ///
    /// Returns `None` once the SDK closes the event stream.
    pub async fn next_event(&mut self) -> Option<FlowState> {
        let event = self.events.recv().await?;
        Some(self.apply(event))
    }

    /// Applies events until a terminal state is reached or the stream
    /// closes, and returns the final state.
    pub async fn run_to_completion(&mut self) -> FlowState {
        while !self.state.is_terminal() {
            if self.next_event().await.is_none() {
                break;
            }
        }
        self.state
    }
}
