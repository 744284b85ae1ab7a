//! Read-only record lists: addresses, payments, profiles and order lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use wardrobe_core::{
    AddressId, AddressKind, CountryCode, Email, OrderId, OrderItemId, PaymentId, UserId,
};

use super::{Paging, RepositoryError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AddressRow {
    pub id: AddressId,
    pub user_email: Email,
    pub street_address: String,
    pub apartment_address: String,
    pub country: CountryCode,
    pub zip: String,
    pub kind: AddressKind,
    pub is_default: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: PaymentId,
    pub stripe_charge_id: String,
    pub user_email: Option<Email>,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: UserId,
    pub user_email: Email,
    pub stripe_customer_id: Option<String>,
    pub one_click_purchasing: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub user_email: Email,
    pub item_title: String,
    pub quantity: i32,
    pub ordered: bool,
}

/// Repository for the read-only record lists.
///
/// Each list returns one page of rows plus the total row count.
pub struct RecordRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecordRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, table: &'static str) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM shop.{table}");
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(self.pool).await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn addresses(
        &self,
        paging: Paging,
    ) -> Result<(Vec<AddressRow>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT a.id, u.email AS user_email, a.street_address, a.apartment_address,
                   a.country, a.zip, a.kind, a.is_default
            FROM shop.address a
            JOIN shop.user u ON u.id = a.user_id
            ORDER BY a.id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;
        Ok((rows, self.count("address").await?))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn payments(
        &self,
        paging: Paging,
    ) -> Result<(Vec<PaymentRow>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT p.id, p.stripe_charge_id, u.email AS user_email, p.amount, p.created_at
            FROM shop.payment p
            LEFT JOIN shop.user u ON u.id = p.user_id
            ORDER BY p.id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;
        Ok((rows, self.count("payment").await?))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn profiles(
        &self,
        paging: Paging,
    ) -> Result<(Vec<ProfileRow>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT p.user_id, u.email AS user_email, p.stripe_customer_id, p.one_click_purchasing
            FROM shop.user_profile p
            JOIN shop.user u ON u.id = p.user_id
            ORDER BY p.user_id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;
        Ok((rows, self.count("user_profile").await?))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn order_items(
        &self,
        paging: Paging,
    ) -> Result<(Vec<OrderItemRow>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, u.email AS user_email, i.title AS item_title,
                   oi.quantity, oi.ordered
            FROM shop.order_item oi
            JOIN shop.user u ON u.id = oi.user_id
            JOIN shop.item i ON i.id = oi.item_id
            ORDER BY oi.id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;
        Ok((rows, self.count("order_item").await?))
    }
}
