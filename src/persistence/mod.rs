//! Mock payment storage.
//!
//! [`PaymentStore`] is the key-value abstraction the mock payment service
//! talks to. Two backends are provided: [`InMemoryPaymentStore`], a
//! process-lifetime table, and [`PostgresPaymentStore`], backed by
//! `sqlx::PgPool` for deployments that want the table to survive
//! restarts or be shared between instances.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{MockPayment, MockPaymentStatus};

pub use memory::InMemoryPaymentStore;
pub use postgres::PostgresPaymentStore;

/// Errors raised by a [`PaymentStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be decoded into a [`MockPayment`].
    #[error("corrupt record {identifier}: {reason}")]
    Corrupt {
        /// Identifier of the offending record.
        identifier: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Key-value store for [`MockPayment`] records.
///
/// Every call is atomic on its own; sequences of calls are not
/// synchronized with each other.
#[async_trait]
pub trait PaymentStore: Send + Sync + std::fmt::Debug {
    /// Creates or overwrites the record for `identifier`.
    ///
    /// `amount` and `memo` carry forward from the existing record when
    /// `None`. A history line is always appended and `updated_at` is
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    async fn upsert(
        &self,
        identifier: &str,
        status: MockPaymentStatus,
        amount: Option<f64>,
        memo: Option<String>,
    ) -> Result<MockPayment, StoreError>;

    /// Returns the record for `identifier`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    async fn get(&self, identifier: &str) -> Result<Option<MockPayment>, StoreError>;

    /// Returns all records in first-insertion order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    async fn list(&self) -> Result<Vec<MockPayment>, StoreError>;

    /// Removes the record for `identifier`. Removing an unknown id is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    async fn delete(&self, identifier: &str) -> Result<(), StoreError>;
}
