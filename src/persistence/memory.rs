//! Process-lifetime in-memory payment store.
//!
//! The table lives only as long as the process. Instances behind a load
//! balancer each hold their own copy.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PaymentStore, StoreError};
use crate::domain::{MockPayment, MockPaymentStatus};

#[derive(Debug, Default)]
struct Table {
    records: HashMap<String, MockPayment>,
    /// Identifiers in first-insertion order.
    order: Vec<String>,
}

/// In-memory [`PaymentStore`] guarded by a single [`RwLock`].
///
/// # Concurrency
///
/// - Each operation holds the lock for its whole read-modify-write, so
///   a single `upsert` is atomic.
/// - Two concurrent `upsert` calls for the same id are serialized but
///   their order is unspecified; history lines may interleave.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    table: RwLock<Table>,
}

impl InMemoryPaymentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.table.read().await.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.records.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn upsert(
        &self,
        identifier: &str,
        status: MockPaymentStatus,
        amount: Option<f64>,
        memo: Option<String>,
    ) -> Result<MockPayment, StoreError> {
        let mut table = self.table.write().await;
        let previous = table.records.remove(identifier);
        if previous.is_none() {
            table.order.push(identifier.to_string());
        }

        let entry = MockPayment::transition(previous, identifier, status, amount, memo, Utc::now());
        table.records.insert(identifier.to_string(), entry.clone());
        Ok(entry)
    }

    async fn get(&self, identifier: &str) -> Result<Option<MockPayment>, StoreError> {
        Ok(self.table.read().await.records.get(identifier).cloned())
    }

    async fn list(&self) -> Result<Vec<MockPayment>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.records.get(id).cloned())
            .collect())
    }

    async fn delete(&self, identifier: &str) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        if table.records.remove(identifier).is_some() {
            table.order.retain(|id| id != identifier);
        }
        Ok(())
    }
}
