//! Order repository: carts, cart lines, checkout and finalization.
//!
//! A cart is the user's single order with `ordered = false`; the partial
//! unique index `idx_order_one_cart` guarantees there is at most one.
//!
//! Cart mutations and payment take `FOR UPDATE` on the cart row, so a line
//! added while a payment is in flight waits and then lands in a fresh cart.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use wardrobe_core::cart::{CartOutcome, Decrement, decrement};
use wardrobe_core::models::{Coupon, Item, Order, OrderLine, OrderSummary};
use wardrobe_core::{AddressKind, CouponId, OrderId, UserId};

use super::RepositoryError;
use super::addresses::{self, BillingChoice, ShippingChoice};

const ORDER_COLUMNS: &str = "id, user_id, reference_code, start_date, ordered_date, ordered, \
     shipping_address_id, billing_address_id, payment_id, coupon_id, \
     being_delivered, received, refund_requested, refund_granted";

/// Payment data recorded when an order is finalized.
#[derive(Debug, Clone)]
pub struct CompletedCharge<'c> {
    pub stripe_charge_id: &'c str,
    pub amount: Decimal,
    pub reference_code: &'c str,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's open cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_for(&self, user_id: UserId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 AND NOT ordered");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Lines and coupon of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn summary(&self, order: &Order) -> Result<OrderSummary, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        summary_of(&mut *conn, order).await
    }

    /// Lock the user's cart for payment.
    ///
    /// Returns `None` when the user has no cart. The lock is held until the
    /// returned [`LockedCart`] is finalized or dropped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn lock_cart(&self, user_id: UserId) -> Result<Option<LockedCart>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = lock_open_cart(&mut *tx, user_id).await? else {
            return Ok(None);
        };
        let summary = summary_of(&mut *tx, &order).await?;
        Ok(Some(LockedCart { tx, order, summary }))
    }

    /// Add one unit of an item to the user's cart, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(&self, user_id: UserId, item: &Item) -> Result<CartOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let cart = lock_or_create_cart(&mut *tx, user_id).await?;

        // xmax is zero only for freshly inserted rows
        let (inserted,): (bool,) = sqlx::query_as(
            r"
            INSERT INTO shop.order_item (user_id, order_id, item_id, quantity)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (order_id, item_id)
            DO UPDATE SET quantity = shop.order_item.quantity + 1
            RETURNING (xmax = 0) AS inserted
            ",
        )
        .bind(user_id)
        .bind(cart.id)
        .bind(item.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(if inserted {
            CartOutcome::Added
        } else {
            CartOutcome::QuantityUpdated
        })
    }

    /// Remove an item's whole line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item: &Item,
    ) -> Result<CartOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let Some(cart) = lock_open_cart(&mut *tx, user_id).await? else {
            return Ok(CartOutcome::NoActiveOrder);
        };

        let result = sqlx::query("DELETE FROM shop.order_item WHERE order_id = $1 AND item_id = $2")
            .bind(cart.id)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(if result.rows_affected() > 0 {
            CartOutcome::Removed
        } else {
            CartOutcome::NotInCart
        })
    }

    /// Take one unit of an item out of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_single_item(
        &self,
        user_id: UserId,
        item: &Item,
    ) -> Result<CartOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let Some(cart) = lock_open_cart(&mut *tx, user_id).await? else {
            return Ok(CartOutcome::NoActiveOrder);
        };

        let quantity: Option<(i32,)> = sqlx::query_as(
            "SELECT quantity FROM shop.order_item WHERE order_id = $1 AND item_id = $2 FOR UPDATE",
        )
        .bind(cart.id)
        .bind(item.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((quantity,)) = quantity else {
            return Ok(CartOutcome::NotInCart);
        };

        let outcome = match decrement(quantity) {
            Decrement::SetQuantity(new_quantity) => {
                sqlx::query(
                    "UPDATE shop.order_item SET quantity = $3 WHERE order_id = $1 AND item_id = $2",
                )
                .bind(cart.id)
                .bind(item.id)
                .bind(new_quantity)
                .execute(&mut *tx)
                .await?;
                CartOutcome::QuantityUpdated
            }
            Decrement::RemoveLine => {
                sqlx::query("DELETE FROM shop.order_item WHERE order_id = $1 AND item_id = $2")
                    .bind(cart.id)
                    .bind(item.id)
                    .execute(&mut *tx)
                    .await?;
                CartOutcome::Removed
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Attach a coupon to an open order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not an open cart.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_coupon(&self, order_id: OrderId, coupon_id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.order SET coupon_id = $2 WHERE id = $1 AND NOT ordered")
            .bind(order_id)
            .bind(coupon_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Create or pick the checkout addresses and assign them to the cart,
    /// all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a referenced address is not the user's.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn apply_checkout(
        &self,
        order: &Order,
        shipping: &ShippingChoice,
        billing: &BillingChoice,
    ) -> Result<(), RepositoryError> {
        let user_id = order.user_id;
        let mut tx = self.pool.begin().await?;

        let shipping_id = match shipping {
            ShippingChoice::Existing(id) => {
                addresses::ensure_owned(&mut tx, user_id, *id, AddressKind::Shipping).await?
            }
            ShippingChoice::New(address) => {
                addresses::insert(&mut tx, user_id, AddressKind::Shipping, address).await?
            }
        };

        let billing_id = match billing {
            BillingChoice::Existing(id) => {
                addresses::ensure_owned(&mut tx, user_id, *id, AddressKind::Billing).await?
            }
            BillingChoice::New(address) => {
                addresses::insert(&mut tx, user_id, AddressKind::Billing, address).await?
            }
            BillingChoice::SameAsShipping { is_default } => {
                addresses::copy_as_billing(&mut tx, user_id, shipping_id, *is_default).await?
            }
        };

        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET shipping_address_id = $2, billing_address_id = $3
            WHERE id = $1 AND NOT ordered
            ",
        )
        .bind(order.id)
        .bind(shipping_id)
        .bind(billing_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Number of lines in the user's cart, zero without a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_line_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(oi.id)
            FROM shop.order o
            JOIN shop.order_item oi ON oi.order_id = o.id
            WHERE o.user_id = $1 AND NOT o.ordered
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// A confirmed order of the user, looked up by reference code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ordered_by_reference(
        &self,
        user_id: UserId,
        reference_code: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 AND reference_code = $2 AND ordered"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(reference_code)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }
}

/// A cart locked for payment, with the summary the charge is computed from.
///
/// Dropping it without calling [`LockedCart::finalize`] rolls back and
/// releases the lock.
pub struct LockedCart {
    tx: Transaction<'static, Postgres>,
    order: Order,
    summary: OrderSummary,
}

impl LockedCart {
    #[must_use]
    pub const fn order(&self) -> &Order {
        &self.order
    }

    #[must_use]
    pub const fn summary(&self) -> &OrderSummary {
        &self.summary
    }

    /// Record the payment and turn the cart into a confirmed order.
    ///
    /// Only the lines that were charged are marked ordered, and the order
    /// total is checked against the charged amount first, since item prices
    /// may change while the charge is in flight.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the total no longer matches the
    /// charge or the order was already placed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn finalize(mut self, charge: &CompletedCharge<'_>) -> Result<(), RepositoryError> {
        let current = summary_of(&mut *self.tx, &self.order).await?;
        if current.total() != charge.amount {
            return Err(RepositoryError::Conflict(format!(
                "order {} totals {} but {} was charged",
                self.order.id,
                current.total(),
                charge.amount
            )));
        }

        let (payment_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO shop.payment (stripe_charge_id, user_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(charge.stripe_charge_id)
        .bind(self.order.user_id)
        .bind(charge.amount)
        .fetch_one(&mut *self.tx)
        .await?;

        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET ordered = TRUE, ordered_date = NOW(), payment_id = $2, reference_code = $3
            WHERE id = $1 AND NOT ordered
            ",
        )
        .bind(self.order.id)
        .bind(payment_id)
        .bind(charge.reference_code)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "reference code"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict("order already placed".to_owned()));
        }

        let line_ids: Vec<i32> = self.summary.lines.iter().map(|l| l.id.as_i32()).collect();
        sqlx::query(
            "UPDATE shop.order_item SET ordered = TRUE WHERE order_id = $1 AND id = ANY($2::int4[])",
        )
        .bind(self.order.id)
        .bind(&line_ids)
        .execute(&mut *self.tx)
        .await?;

        self.tx.commit().await?;
        Ok(())
    }
}

/// The user's open cart, locked until the transaction ends.
async fn lock_open_cart(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Option<Order>, RepositoryError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 AND NOT ordered FOR UPDATE"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// The user's open cart, created if missing, locked until the transaction ends.
async fn lock_or_create_cart(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Order, RepositoryError> {
    if let Some(order) = lock_open_cart(conn, user_id).await? {
        return Ok(order);
    }

    sqlx::query(
        r"
        INSERT INTO shop.order (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) WHERE NOT ordered DO NOTHING
        ",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    lock_open_cart(conn, user_id)
        .await?
        .ok_or_else(|| RepositoryError::DataCorruption("cart vanished after insert".to_owned()))
}

/// Lines of an order joined with their items, and its coupon.
async fn summary_of(conn: &mut PgConnection, order: &Order) -> Result<OrderSummary, RepositoryError> {
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
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    let coupon = match order.coupon_id {
        Some(id) => {
            sqlx::query_as::<_, Coupon>("SELECT id, code, amount FROM shop.coupon WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => None,
    };

    Ok(OrderSummary { lines, coupon })
}
