//! Cart, checkout, payment, refund and admin queries against PostgreSQL.
//!
//! Each test creates its own user and items, so the suite can share one
//! database. Run with `DATABASE_URL` set and `--ignored`.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::PgPool;

use wardrobe_core::cart::CartOutcome;
use wardrobe_core::models::{Address, Item, Order};
use wardrobe_core::{AddressKind, Email, UserId};
use wardrobe_integration_tests::{
    address, create_coupon, create_item, create_user, migrated_pool, storefront_config,
    unique_email,
};
use wardrobe_storefront::db::addresses::{BillingChoice, ShippingChoice};
use wardrobe_storefront::db::orders::CompletedCharge;
use wardrobe_storefront::db::{
    AddressRepository, OrderRepository, RefundRepository, RepositoryError,
};
use wardrobe_storefront::forms::PaymentForm;
use wardrobe_storefront::models::CurrentUser;
use wardrobe_storefront::services::payment::{PaymentError, PaymentService, StripeClient};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn cart(pool: &PgPool, user: UserId) -> Order {
    OrderRepository::new(pool).cart_for(user).await.unwrap().unwrap()
}

async fn check_out(pool: &PgPool, user: UserId) {
    let order = cart(pool, user).await;
    OrderRepository::new(pool)
        .apply_checkout(
            &order,
            &ShippingChoice::New(address("Unter den Linden 1", false)),
            &BillingChoice::SameAsShipping { is_default: false },
        )
        .await
        .unwrap();
}

/// Lock the cart and finalize it with a charge for `amount`.
async fn place(pool: &PgPool, user: UserId, amount: Decimal) -> Result<String, RepositoryError> {
    let locked = OrderRepository::new(pool).lock_cart(user).await?.unwrap();
    let reference = reference_code();
    locked
        .finalize(&CompletedCharge {
            stripe_charge_id: "ch_test",
            amount,
            reference_code: &reference,
        })
        .await?;
    Ok(reference)
}

fn reference_code() -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(17).collect();
    format!("REF{}", suffix.to_uppercase())
}

async fn placed_order(pool: &PgPool, user: UserId) -> (Order, Item) {
    let item = create_item(pool, "30.00").await;
    OrderRepository::new(pool).add_item(user, &item).await.unwrap();
    check_out(pool, user).await;
    let reference = place(pool, user, dec("30.00")).await.unwrap();
    let order = OrderRepository::new(pool)
        .ordered_by_reference(user, &reference)
        .await
        .unwrap()
        .unwrap();
    (order, item)
}

async fn addresses_of(pool: &PgPool, user: UserId) -> Vec<Address> {
    sqlx::query_as::<_, Address>(
        r"
        SELECT id, user_id, street_address, apartment_address, country, zip, kind, is_default
        FROM shop.address WHERE user_id = $1 ORDER BY id
        ",
    )
    .bind(user)
    .fetch_all(pool)
    .await
    .unwrap()
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_adding_twice_increments_quantity() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    let orders = OrderRepository::new(&pool);

    assert_eq!(orders.add_item(user, &item).await.unwrap(), CartOutcome::Added);
    assert_eq!(
        orders.add_item(user, &item).await.unwrap(),
        CartOutcome::QuantityUpdated
    );

    let summary = orders.summary(&cart(&pool, user).await).await.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].quantity, 2);
    assert_eq!(summary.total(), dec("20.00"));
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_decrement_removes_line_at_zero() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    let orders = OrderRepository::new(&pool);

    orders.add_item(user, &item).await.unwrap();
    orders.add_item(user, &item).await.unwrap();

    assert_eq!(
        orders.remove_single_item(user, &item).await.unwrap(),
        CartOutcome::QuantityUpdated
    );
    assert_eq!(
        orders.remove_single_item(user, &item).await.unwrap(),
        CartOutcome::Removed
    );
    assert_eq!(
        orders.remove_single_item(user, &item).await.unwrap(),
        CartOutcome::NotInCart
    );
    assert_eq!(
        orders.remove_item(user, &item).await.unwrap(),
        CartOutcome::NotInCart
    );
    assert_eq!(orders.cart_line_count(user).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_removal_without_cart() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    let orders = OrderRepository::new(&pool);

    assert_eq!(
        orders.remove_item(user, &item).await.unwrap(),
        CartOutcome::NoActiveOrder
    );
    assert_eq!(
        orders.remove_single_item(user, &item).await.unwrap(),
        CartOutcome::NoActiveOrder
    );
    assert!(orders.cart_for(user).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_concurrent_adds_share_one_cart() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let shirt = create_item(&pool, "10.00").await;
    let scarf = create_item(&pool, "5.00").await;
    let orders = OrderRepository::new(&pool);

    let (a, b) = tokio::join!(orders.add_item(user, &shirt), orders.add_item(user, &scarf));
    assert_eq!(a.unwrap(), CartOutcome::Added);
    assert_eq!(b.unwrap(), CartOutcome::Added);

    let (carts,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM shop.order WHERE user_id = $1 AND NOT ordered")
            .bind(user)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(carts, 1);
    assert_eq!(orders.cart_line_count(user).await.unwrap(), 2);

    let second_cart = sqlx::query("INSERT INTO shop.order (user_id) VALUES ($1)")
        .bind(user)
        .execute(&pool)
        .await;
    assert!(second_cart.is_err());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_coupon_lowers_total() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    let coupon = create_coupon(&pool, "4.00").await;
    let orders = OrderRepository::new(&pool);

    orders.add_item(user, &item).await.unwrap();
    let order = cart(&pool, user).await;
    orders.set_coupon(order.id, coupon.id).await.unwrap();

    let summary = orders.summary(&cart(&pool, user).await).await.unwrap();
    assert_eq!(summary.total(), dec("6.00"));
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_checkout_replaces_default_and_copies_billing() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    let orders = OrderRepository::new(&pool);
    orders.add_item(user, &item).await.unwrap();

    let order = cart(&pool, user).await;
    orders
        .apply_checkout(
            &order,
            &ShippingChoice::New(address("Old Street 1", true)),
            &BillingChoice::SameAsShipping { is_default: true },
        )
        .await
        .unwrap();

    let order = cart(&pool, user).await;
    orders
        .apply_checkout(
            &order,
            &ShippingChoice::New(address("New Street 2", true)),
            &BillingChoice::SameAsShipping { is_default: false },
        )
        .await
        .unwrap();

    let saved = addresses_of(&pool, user).await;
    assert_eq!(saved.len(), 4);

    let defaults = AddressRepository::new(&pool);
    let shipping = defaults
        .default_for(user, AddressKind::Shipping)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shipping.street_address, "New Street 2");
    let shipping_defaults = saved
        .iter()
        .filter(|a| a.kind == AddressKind::Shipping && a.is_default)
        .count();
    assert_eq!(shipping_defaults, 1);

    // The first billing copy stays the default; the second is not
    let billing = defaults
        .default_for(user, AddressKind::Billing)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(billing.street_address, "Old Street 1");

    let order = cart(&pool, user).await;
    let billing = defaults
        .get(user, order.billing_address_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(billing.kind, AddressKind::Billing);
    assert_eq!(billing.street_address, "New Street 2");
    assert_ne!(order.billing_address_id, order.shipping_address_id);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_checkout_refuses_foreign_address() {
    let pool = migrated_pool().await;
    let owner = create_user(&pool).await;
    let other = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    let orders = OrderRepository::new(&pool);

    orders.add_item(owner, &item).await.unwrap();
    check_out(&pool, owner).await;
    let foreign = cart(&pool, owner).await.shipping_address_id.unwrap();

    orders.add_item(other, &item).await.unwrap();
    let result = orders
        .apply_checkout(
            &cart(&pool, other).await,
            &ShippingChoice::Existing(foreign),
            &BillingChoice::SameAsShipping { is_default: false },
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
    assert!(addresses_of(&pool, other).await.is_empty());
}

// =============================================================================
// Payment
// =============================================================================

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_line_added_during_payment_stays_in_cart() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let shirt = create_item(&pool, "10.00").await;
    let scarf = create_item(&pool, "10.00").await;
    OrderRepository::new(&pool).add_item(user, &shirt).await.unwrap();
    check_out(&pool, user).await;

    let locked = OrderRepository::new(&pool).lock_cart(user).await.unwrap().unwrap();
    let charged = locked.summary().total();
    assert_eq!(charged, dec("10.00"));

    let adder_pool = pool.clone();
    let adding = tokio::spawn(async move {
        OrderRepository::new(&adder_pool).add_item(user, &scarf).await
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!adding.is_finished(), "cart changes wait for the payment");

    let placed_id = locked.order().id;
    locked
        .finalize(&CompletedCharge {
            stripe_charge_id: "ch_test",
            amount: charged,
            reference_code: &reference_code(),
        })
        .await
        .unwrap();
    assert_eq!(adding.await.unwrap().unwrap(), CartOutcome::Added);

    let placed: Vec<(String, bool)> = sqlx::query_as(
        r"
        SELECT i.slug, oi.ordered FROM shop.order_item oi
        JOIN shop.item i ON i.id = oi.item_id
        WHERE oi.order_id = $1
        ",
    )
    .bind(placed_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(placed, vec![(shirt.slug.clone(), true)]);

    let next_cart = cart(&pool, user).await;
    assert_ne!(next_cart.id, placed_id);
    let summary = OrderRepository::new(&pool).summary(&next_cart).await.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert!(!summary.lines[0].ordered);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_finalize_rejects_mismatched_charge() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    OrderRepository::new(&pool).add_item(user, &item).await.unwrap();
    check_out(&pool, user).await;

    let result = place(&pool, user, dec("5.00")).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    let order = cart(&pool, user).await;
    assert!(!order.ordered);
    assert!(order.payment_id.is_none());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_placed_order_cannot_be_locked_again() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let (order, _) = placed_order(&pool, user).await;

    assert!(order.ordered);
    assert!(order.ordered_date.is_some());
    assert!(order.payment_id.is_some());
    assert!(OrderRepository::new(&pool).lock_cart(user).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_payment_requires_billing_address() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let item = create_item(&pool, "10.00").await;
    OrderRepository::new(&pool).add_item(user, &item).await.unwrap();

    let config = storefront_config();
    let stripe = StripeClient::new(&config.stripe).unwrap();
    let current = CurrentUser {
        id: user,
        email: Email::parse(&unique_email("payer")).unwrap(),
    };
    let form = PaymentForm {
        stripe_token: Some("tok_visa".to_owned()),
        ..PaymentForm::default()
    };

    let result = PaymentService::new(&pool, &stripe).pay(&current, &form).await;
    assert!(matches!(result, Err(PaymentError::NoBillingAddress)));
    assert!(!cart(&pool, user).await.ordered);
}

// =============================================================================
// Refunds
// =============================================================================

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_second_refund_request_conflicts() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let (order, _) = placed_order(&pool, user).await;
    let email = Email::parse(&unique_email("refund")).unwrap();
    let refunds = RefundRepository::new(&pool);

    refunds.request(order.id, "Too small", &email).await.unwrap();
    let again = refunds.request(order.id, "Still too small", &email).await;
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));

    let (requested, count): (bool, i64) = sqlx::query_as(
        r"
        SELECT o.refund_requested, (SELECT COUNT(*) FROM shop.refund r WHERE r.order_id = o.id)
        FROM shop.order o WHERE o.id = $1
        ",
    )
    .bind(order.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(requested);
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_admin_grants_refunds() {
    let pool = migrated_pool().await;
    let user = create_user(&pool).await;
    let (order, _) = placed_order(&pool, user).await;
    let email = Email::parse(&unique_email("refund")).unwrap();
    RefundRepository::new(&pool)
        .request(order.id, "Wrong colour", &email)
        .await
        .unwrap();

    let updated = wardrobe_admin::db::OrderRepository::new(&pool)
        .grant_refunds(&[order.id])
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let (requested, granted, accepted): (bool, bool, bool) = sqlx::query_as(
        r"
        SELECT o.refund_requested, o.refund_granted, r.accepted
        FROM shop.order o JOIN shop.refund r ON r.order_id = o.id
        WHERE o.id = $1
        ",
    )
    .bind(order.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(!requested);
    assert!(granted);
    assert!(accepted);

    // A granted refund cannot be requested again
    let again = RefundRepository::new(&pool)
        .request(order.id, "Once more", &email)
        .await;
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));
}
