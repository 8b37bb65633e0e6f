//! PostgreSQL implementation of the payment store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{MockPaymentRow, MockPaymentTuple};
use super::{PaymentStore, StoreError};
use crate::domain::mock_payment::history_line;
use crate::domain::{MockPayment, MockPaymentStatus};

const SELECT_COLUMNS: &str = "identifier, status, amount, memo, updated_at, history";

/// PostgreSQL-backed [`PaymentStore`] using `sqlx::PgPool`.
///
/// `upsert` is a single `INSERT ... ON CONFLICT DO UPDATE` statement, so
/// the carry-forward of `amount`/`memo` and the history append happen
/// atomically in the database.
#[derive(Debug, Clone)]
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the connection or a migration fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections, "postgres payment store ready");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn upsert(
        &self,
        identifier: &str,
        status: MockPaymentStatus,
        amount: Option<f64>,
        memo: Option<String>,
    ) -> Result<MockPayment, StoreError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO mock_payments (identifier, status, amount, memo, updated_at, history) \
             VALUES ($1, $2, $3, $4, $5, jsonb_build_array($6::text)) \
             ON CONFLICT (identifier) DO UPDATE SET \
               status = EXCLUDED.status, \
               amount = COALESCE(EXCLUDED.amount, mock_payments.amount), \
               memo = COALESCE(EXCLUDED.memo, mock_payments.memo), \
               updated_at = EXCLUDED.updated_at, \
               history = mock_payments.history || EXCLUDED.history \
             RETURNING {SELECT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, MockPaymentTuple>(&sql)
            .bind(identifier)
            .bind(status.as_str())
            .bind(amount)
            .bind(memo)
            .bind(now)
            .bind(history_line(status, now))
            .fetch_one(&self.pool)
            .await?;

        MockPayment::try_from(MockPaymentRow::from(row))
    }

    async fn get(&self, identifier: &str) -> Result<Option<MockPayment>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM mock_payments WHERE identifier = $1");
        let row = sqlx::query_as::<_, MockPaymentTuple>(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| MockPayment::try_from(MockPaymentRow::from(r)))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<MockPayment>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM mock_payments ORDER BY seq ASC");
        let rows = sqlx::query_as::<_, MockPaymentTuple>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| MockPayment::try_from(MockPaymentRow::from(r)))
            .collect()
    }

    async fn delete(&self, identifier: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM mock_payments WHERE identifier = $1")
            .bind(identifier)
            .execute(&self.pool)
            .await?;

        tracing::debug!(identifier, rows = result.rows_affected(), "mock payment deleted");
        Ok(())
    }
}
