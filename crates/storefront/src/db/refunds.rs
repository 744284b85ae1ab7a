//! Refund requests.

use sqlx::PgPool;

use wardrobe_core::{Email, OrderId, RefundId};

use super::RepositoryError;

/// Repository for refund database operations.
pub struct RefundRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RefundRepository<'a> {
    /// Create a new refund repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Flag the order as refund-requested and store the request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a refund was already requested
    /// or granted for the order.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn request(
        &self,
        order_id: OrderId,
        reason: &str,
        email: &Email,
    ) -> Result<RefundId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET refund_requested = TRUE
            WHERE id = $1 AND ordered AND NOT refund_requested AND NOT refund_granted
            ",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict("refund already requested".to_owned()));
        }

        let (id,): (RefundId,) = sqlx::query_as(
            r"
            INSERT INTO shop.refund (order_id, reason, email)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(order_id)
        .bind(reason)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, refund_id = %id, "Refund requested");
        Ok(id)
    }
}
