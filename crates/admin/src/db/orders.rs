//! Order administration: filtered lists, detail, status toggles and the
//! bulk refund grant.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use wardrobe_core::models::{Address, Coupon, Order, OrderLine, OrderSummary, Payment, Refund};
use wardrobe_core::{Email, OrderId};

use super::{Paging, RepositoryError};

const ORDER_COLUMNS: &str = "id, user_id, reference_code, start_date, ordered_date, ordered, \
     shipping_address_id, billing_address_id, payment_id, coupon_id, \
     being_delivered, received, refund_requested, refund_granted";

const ADDRESS_COLUMNS: &str =
    "id, user_id, street_address, apartment_address, country, zip, kind, is_default";

/// Filters of the order list. `None` leaves a flag unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub ordered: Option<bool>,
    pub being_delivered: Option<bool>,
    pub received: Option<bool>,
    pub refund_requested: Option<bool>,
    pub refund_granted: Option<bool>,
    /// `ILIKE` pattern matched against the user's email and the reference code.
    pub search: Option<String>,
}

/// An order row in the admin list.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub user_email: Email,
    pub reference_code: Option<String>,
    pub ordered: bool,
    pub ordered_date: Option<DateTime<Utc>>,
    pub being_delivered: bool,
    pub received: bool,
    pub refund_requested: bool,
    pub refund_granted: bool,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub stripe_charge_id: Option<String>,
    pub coupon_code: Option<String>,
}

/// Everything the order detail page shows.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub user_email: Email,
    pub summary: OrderSummary,
    pub shipping: Option<Address>,
    pub billing: Option<Address>,
    pub payment: Option<Payment>,
    pub refunds: Vec<Refund>,
}

/// Repository for order administration.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders and carts matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        paging: Paging,
    ) -> Result<Vec<OrderRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT o.id, u.email AS user_email, o.reference_code, o.ordered, o.ordered_date,
                   o.being_delivered, o.received, o.refund_requested, o.refund_granted,
                   CASE WHEN sa.id IS NULL THEN NULL ELSE concat_ws(', ',
                       sa.street_address, NULLIF(sa.apartment_address, ''), sa.zip, sa.country)
                   END AS shipping_address,
                   CASE WHEN ba.id IS NULL THEN NULL ELSE concat_ws(', ',
                       ba.street_address, NULLIF(ba.apartment_address, ''), ba.zip, ba.country)
                   END AS billing_address,
                   p.stripe_charge_id,
                   c.code AS coupon_code
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            LEFT JOIN shop.address sa ON sa.id = o.shipping_address_id
            LEFT JOIN shop.address ba ON ba.id = o.billing_address_id
            LEFT JOIN shop.payment p ON p.id = o.payment_id
            LEFT JOIN shop.coupon c ON c.id = o.coupon_id
            WHERE ($1::bool IS NULL OR o.ordered = $1)
              AND ($2::bool IS NULL OR o.being_delivered = $2)
              AND ($3::bool IS NULL OR o.received = $3)
              AND ($4::bool IS NULL OR o.refund_requested = $4)
              AND ($5::bool IS NULL OR o.refund_granted = $5)
              AND ($6::text IS NULL OR u.email ILIKE $6 OR o.reference_code ILIKE $6)
            ORDER BY o.id DESC
            LIMIT $7 OFFSET $8
            ",
        )
        .bind(filter.ordered)
        .bind(filter.being_delivered)
        .bind(filter.received)
        .bind(filter.refund_requested)
        .bind(filter.refund_granted)
        .bind(filter.search.as_deref())
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Count orders matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &OrderFilter) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            WHERE ($1::bool IS NULL OR o.ordered = $1)
              AND ($2::bool IS NULL OR o.being_delivered = $2)
              AND ($3::bool IS NULL OR o.received = $3)
              AND ($4::bool IS NULL OR o.refund_requested = $4)
              AND ($5::bool IS NULL OR o.refund_granted = $5)
              AND ($6::text IS NULL OR u.email ILIKE $6 OR o.reference_code ILIKE $6)
            ",
        )
        .bind(filter.ordered)
        .bind(filter.being_delivered)
        .bind(filter.received)
        .bind(filter.refund_requested)
        .bind(filter.refund_granted)
        .bind(filter.search.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Load an order with its lines, addresses, payment, coupon and refunds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1");
        let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let (user_email,): (Email,) = sqlx::query_as("SELECT email FROM shop.user WHERE id = $1")
            .bind(order.user_id)
            .fetch_one(self.pool)
            .await?;

        let lines = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT oi.id, oi.order_id, oi.item_id, oi.quantity, oi.ordered,
                   i.title AS item_title, i.slug AS item_slug, i.image AS item_image,
                   i.price, i.discount_price
            FROM shop.order_item oi
            JOIN shop.item i ON i.id = oi.item_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT id, code, amount FROM shop.coupon WHERE id = $1",
        )
        .bind(order.coupon_id)
        .fetch_optional(self.pool)
        .await?;

        let address_sql = format!("SELECT {ADDRESS_COLUMNS} FROM shop.address WHERE id = $1");
        let shipping = sqlx::query_as::<_, Address>(&address_sql)
            .bind(order.shipping_address_id)
            .fetch_optional(self.pool)
            .await?;
        let billing = sqlx::query_as::<_, Address>(&address_sql)
            .bind(order.billing_address_id)
            .fetch_optional(self.pool)
            .await?;

        let payment = sqlx::query_as::<_, Payment>(
            "SELECT id, stripe_charge_id, user_id, amount, created_at FROM shop.payment WHERE id = $1",
        )
        .bind(order.payment_id)
        .fetch_optional(self.pool)
        .await?;

        let refunds = sqlx::query_as::<_, Refund>(
            "SELECT id, order_id, reason, accepted, email FROM shop.refund WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order,
            user_email,
            summary: OrderSummary { lines, coupon },
            shipping,
            billing,
            payment,
            refunds,
        }))
    }

    /// Set the delivery flags of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_delivery_status(
        &self,
        id: OrderId,
        being_delivered: bool,
        received: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.order SET being_delivered = $2, received = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(being_delivered)
        .bind(received)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(order_id = %id, being_delivered, received, "Order delivery status updated");
        Ok(())
    }

    /// Mark the orders' refunds as granted and their refund requests as accepted.
    ///
    /// Returns the number of orders updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn grant_refunds(&self, ids: &[OrderId]) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(OrderId::as_i32).collect();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE shop.order
            SET refund_requested = FALSE, refund_granted = TRUE
            WHERE id = ANY($1::int4[])
            ",
        )
        .bind(&ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("UPDATE shop.refund SET accepted = TRUE WHERE order_id = ANY($1::int4[])")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(count = updated, "Refunds granted");
        Ok(updated)
    }
}
