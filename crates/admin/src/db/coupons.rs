//! Coupon administration.

use rust_decimal::Decimal;
use sqlx::PgPool;

use wardrobe_core::CouponId;
use wardrobe_core::models::Coupon;

use super::RepositoryError;

/// Repository for coupon CRUD.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All coupons, by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons =
            sqlx::query_as::<_, Coupon>("SELECT id, code, amount FROM shop.coupon ORDER BY code")
                .fetch_all(self.pool)
                .await?;
        Ok(coupons)
    }

    /// Get a coupon by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let coupon =
            sqlx::query_as::<_, Coupon>("SELECT id, code, amount FROM shop.coupon WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(coupon)
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(&self, code: &str, amount: Decimal) -> Result<Coupon, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "INSERT INTO shop.coupon (code, amount) VALUES ($1, $2) RETURNING id, code, amount",
        )
        .bind(code)
        .bind(amount)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "coupon code"))?;

        tracing::info!(coupon_id = %coupon.id, "Coupon created");
        Ok(coupon)
    }

    /// Update a coupon's code and amount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist and
    /// `RepositoryError::Conflict` if the code is taken.
    pub async fn update(
        &self,
        id: CouponId,
        code: &str,
        amount: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.coupon SET code = $2, amount = $3 WHERE id = $1")
            .bind(id)
            .bind(code)
            .bind(amount)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "coupon code"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a coupon. Orders using it keep their lines and lose the discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    pub async fn delete(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.coupon WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(coupon_id = %id, "Coupon deleted");
        Ok(())
    }
}
