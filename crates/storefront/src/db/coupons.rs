//! Coupon lookups.

use sqlx::PgPool;

use wardrobe_core::models::Coupon;

use super::RepositoryError;

/// Repository for coupon reads.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a coupon by its exact code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let coupon =
            sqlx::query_as::<_, Coupon>("SELECT id, code, amount FROM shop.coupon WHERE code = $1")
                .bind(code)
                .fetch_optional(self.pool)
                .await?;
        Ok(coupon)
    }
}
