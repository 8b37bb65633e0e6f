//! Domain layer: payment records and the values exchanged with the Pi
//! platform.
//!
//! [`MockPayment`] is the reviewer-facing record kept by the mock payment
//! store. The `pi` types are pass-through shapes owned by the upstream
//! wallet API; the gateway only checks that identifiers are present.

pub mod mock_payment;
pub mod pi;

pub use mock_payment::{MockPayment, MockPaymentStatus};
pub use pi::{AuthResult, PiPayment, PiUser};
