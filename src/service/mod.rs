//! Service layer: business logic orchestration.
//!
//! [`PaymentProxy`] forwards payment actions to the Pi API,
//! [`IdentityService`] verifies SDK access tokens, and
//! [`MockPaymentService`] drives the reviewer-facing mock store.

pub mod identity_service;
pub mod mock_service;
pub mod payment_service;
pub mod pi_client;

pub use identity_service::IdentityService;
pub use mock_service::{MockAction, MockOutcome, MockPaymentService};
pub use payment_service::{ActionCommand, PaymentAction, PaymentProxy};
pub use pi_client::{PiApiClient, ProxyReply};
