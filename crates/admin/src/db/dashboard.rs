//! Dashboard counters.

use sqlx::PgPool;

use super::RepositoryError;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct DashboardCounts {
    pub items: i64,
    pub open_carts: i64,
    pub orders: i64,
    pub pending_refunds: i64,
}

/// Repository for dashboard statistics.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count items, open carts, placed orders and unaccepted refunds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<DashboardCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r"
            SELECT
                (SELECT COUNT(*) FROM shop.item) AS items,
                (SELECT COUNT(*) FROM shop.order WHERE NOT ordered) AS open_carts,
                (SELECT COUNT(*) FROM shop.order WHERE ordered) AS orders,
                (SELECT COUNT(*) FROM shop.refund WHERE NOT accepted) AS pending_refunds
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }
}
