//! Refund request administration.

use sqlx::PgPool;

use wardrobe_core::{Email, OrderId, RefundId};

use super::{Paging, RepositoryError};

/// A refund request row with its order's reference code.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefundRow {
    pub id: RefundId,
    pub order_id: OrderId,
    pub reference_code: Option<String>,
    pub reason: String,
    pub email: Email,
    pub accepted: bool,
}

/// Repository for refund requests.
pub struct RefundRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RefundRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Refund requests, pending ones first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, paging: Paging) -> Result<Vec<RefundRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, RefundRow>(
            r"
            SELECT r.id, r.order_id, o.reference_code, r.reason, r.email, r.accepted
            FROM shop.refund r
            JOIN shop.order o ON o.id = r.order_id
            ORDER BY r.accepted, r.id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Count refund requests.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.refund")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Mark a refund request as accepted, returning its order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the refund doesn't exist.
    pub async fn accept(&self, id: RefundId) -> Result<OrderId, RepositoryError> {
        let order_id: Option<(OrderId,)> =
            sqlx::query_as("UPDATE shop.refund SET accepted = TRUE WHERE id = $1 RETURNING order_id")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let (order_id,) = order_id.ok_or(RepositoryError::NotFound)?;
        tracing::info!(refund_id = %id, order_id = %order_id, "Refund accepted");
        Ok(order_id)
    }
}
