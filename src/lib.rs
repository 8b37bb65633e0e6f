//! # pi-gateway
//!
//! Server-side companion for Pi Network apps: a payment lifecycle proxy
//! in front of the Pi payments API, a reviewer-facing mock payment
//! store, and a typed adapter over the client wallet SDK.
//!
//! ## Architecture
//!
//! ```text
//! Wallet SDK (client)
//!     │
//!     ├── SdkAdapter / PaymentFlow (sdk/)
//!     │
//! REST Handlers (api/)
//!     │
//!     ├── PaymentProxy ──► Pi payments API
//!     ├── IdentityService ──► Pi /me
//!     ├── MockPaymentService (service/)
//!     │
//!     └── PaymentStore (persistence/)
//!           ├── in-memory
//!           └── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod sdk;
pub mod service;
