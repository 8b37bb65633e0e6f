//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire to match what the wallet SDK
//! and browser clients send.

pub mod mock_dto;
pub mod payment_dto;
pub mod verify_dto;

pub use mock_dto::*;
pub use payment_dto::*;
pub use verify_dto::*;
