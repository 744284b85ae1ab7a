//! Order payment through Stripe.
//!
//! [`plan_payment`] decides from the payment form and the user's profile how
//! the order is paid; [`PaymentService::pay`] carries the plan out, records
//! the payment and turns the cart into an order.
//!
//! The cart stays locked from the moment its total is read until the order
//! is placed, so the charged amount and the placed lines agree.

pub mod stripe;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use wardrobe_core::cart::CartOutcome;
use wardrobe_core::models::Order;
use wardrobe_core::{Money, OrderId};

pub use stripe::{Card, ChargeSource, StripeClient, StripeError};

use crate::db::orders::CompletedCharge;
use crate::db::{OrderRepository, RepositoryError, UserRepository};
use crate::forms::PaymentForm;
use crate::models::CurrentUser;
use crate::services::reference::generate_reference_code;

/// Why a payment did not go through.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The user has no cart to pay for.
    #[error("no active order")]
    NoActiveOrder,

    /// Checkout has not assigned a billing address to the cart.
    #[error("no billing address")]
    NoBillingAddress,

    /// Order total is zero after discounts.
    #[error("order total is zero")]
    ZeroTotal,

    /// `use_default` was requested without a saved customer.
    #[error("no saved card")]
    NoSavedCard,

    /// Neither a card token nor a saved card was supplied.
    #[error("missing card token")]
    MissingToken,

    /// Stripe rejected or failed the request.
    #[error("gateway error: {0}")]
    Gateway(#[from] StripeError),

    /// Recording the payment failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// The order could not be placed after the charge; the charge was refunded.
    #[error("order not placed, charge refunded: {0}")]
    Refunded(RepositoryError),
}

impl PaymentError {
    /// Message shown to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoActiveOrder => CartOutcome::NoActiveOrder.message().to_owned(),
            Self::NoBillingAddress => "You have not added a billing address.".to_owned(),
            Self::ZeroTotal => "Your order total must be greater than zero.".to_owned(),
            Self::NoSavedCard => "You do not have a saved card.".to_owned(),
            Self::MissingToken => "Invalid data received.".to_owned(),
            Self::Gateway(err) => err.user_message(),
            Self::Repository(_) => "A serious error occurred. We have been notified.".to_owned(),
            Self::Refunded(_) => {
                "Your order could not be placed and your payment was refunded. Please try again."
                    .to_owned()
            }
        }
    }

    /// Page the customer is sent back to.
    #[must_use]
    pub const fn retry_path(&self) -> &'static str {
        match self {
            Self::NoActiveOrder => "/",
            Self::NoBillingAddress => "/checkout",
            _ => "/payment/stripe",
        }
    }
}

/// Check that checkout has prepared the cart for payment.
///
/// # Errors
///
/// Returns `PaymentError::NoBillingAddress` if the cart has no billing address.
pub const fn ready_to_pay(order: &Order) -> Result<(), PaymentError> {
    if order.billing_address_id.is_none() {
        return Err(PaymentError::NoBillingAddress);
    }
    Ok(())
}

/// Idempotency key of a charge: one per order, amount and card.
#[must_use]
pub fn charge_key(order_id: OrderId, amount: i64, source: &ChargeSource<'_>) -> String {
    format!("order-{order_id}-{amount}-{}", source.source_id())
}

/// How an order will be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPlan<'a> {
    /// Charge a single-use card token.
    Token(&'a str),
    /// Create a Stripe customer from the token, then charge it.
    SaveNewCustomer { token: &'a str },
    /// Attach the token as a new card of the customer, then charge that card.
    SaveCardToCustomer { customer: &'a str, token: &'a str },
    /// Charge the customer's saved default card.
    SavedCustomer(&'a str),
}

/// Decide how to pay from the submitted form and the saved customer id.
///
/// # Errors
///
/// Returns `PaymentError::NoSavedCard` when `use_default` is set without a
/// saved customer, and `PaymentError::MissingToken` when a card token is
/// required but absent.
pub fn plan_payment<'a>(
    form: &'a PaymentForm,
    customer_id: Option<&'a str>,
) -> Result<PaymentPlan<'a>, PaymentError> {
    let customer_id = customer_id.filter(|id| !id.is_empty());

    if form.use_default {
        return customer_id
            .map(PaymentPlan::SavedCustomer)
            .ok_or(PaymentError::NoSavedCard);
    }

    let token = form.token().ok_or(PaymentError::MissingToken)?;

    Ok(match (form.save, customer_id) {
        (true, Some(customer)) => PaymentPlan::SaveCardToCustomer { customer, token },
        (true, None) => PaymentPlan::SaveNewCustomer { token },
        (false, _) => PaymentPlan::Token(token),
    })
}

/// Total in minor units, refusing zero.
///
/// # Errors
///
/// Returns `PaymentError::ZeroTotal` when nothing is left to charge.
pub fn chargeable_amount(
    total: Decimal,
    currency: wardrobe_core::CurrencyCode,
) -> Result<i64, PaymentError> {
    Money::new(total, currency)
        .to_minor_units()
        .filter(|amount| *amount > 0)
        .ok_or(PaymentError::ZeroTotal)
}

/// Pays orders and records the result.
pub struct PaymentService<'a> {
    pool: &'a PgPool,
    stripe: &'a StripeClient,
}

impl<'a> PaymentService<'a> {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stripe: &'a StripeClient) -> Self {
        Self { pool, stripe }
    }

    /// Cards the user saved for one-click purchasing.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the profile lookup or the Stripe request fails.
    pub async fn saved_cards(&self, user: &CurrentUser) -> Result<Vec<Card>, PaymentError> {
        let profile = UserRepository::new(self.pool).get_profile(user.id).await?;
        match profile.stripe_customer_id.as_deref() {
            Some(customer) if profile.one_click_purchasing && !customer.is_empty() => {
                Ok(self.stripe.list_cards(customer).await?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Charge the user's cart and place the order.
    ///
    /// Returns the new reference code.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` describing why the payment failed.
    pub async fn pay(&self, user: &CurrentUser, form: &PaymentForm) -> Result<String, PaymentError> {
        let cart = OrderRepository::new(self.pool)
            .lock_cart(user.id)
            .await?
            .ok_or(PaymentError::NoActiveOrder)?;
        let order = cart.order().clone();
        ready_to_pay(&order)?;

        let total = cart.summary().total();
        let amount = chargeable_amount(total, self.stripe.currency())?;

        let users = UserRepository::new(self.pool);
        let profile = users.get_profile(user.id).await?;
        let plan = plan_payment(form, profile.stripe_customer_id.as_deref())?;
        let description = format!("Order {} for {}", order.id, user.email);

        let charge = match plan {
            PaymentPlan::Token(token) => {
                self.charge(&order, amount, ChargeSource::Token(token), &description)
                    .await?
            }
            PaymentPlan::SaveNewCustomer { token } => {
                let customer = self
                    .stripe
                    .create_customer(user.email.as_str(), token)
                    .await?;
                users.set_stripe_customer(user.id, &customer.id).await?;
                self.charge(&order, amount, ChargeSource::Customer(&customer.id), &description)
                    .await?
            }
            PaymentPlan::SaveCardToCustomer { customer, token } => {
                let card = self.stripe.add_card(customer, token).await?;
                users.set_stripe_customer(user.id, customer).await?;
                let source = ChargeSource::CustomerCard {
                    customer,
                    card: &card.id,
                };
                self.charge(&order, amount, source, &description).await?
            }
            PaymentPlan::SavedCustomer(customer) => {
                self.charge(&order, amount, ChargeSource::Customer(customer), &description)
                    .await?
            }
        };

        let reference_code = generate_reference_code();
        let placed = cart
            .finalize(&CompletedCharge {
                stripe_charge_id: &charge.id,
                amount: total,
                reference_code: &reference_code,
            })
            .await;

        if let Err(e) = placed {
            tracing::error!(
                order_id = %order.id,
                charge_id = %charge.id,
                error = %e,
                "Charge captured but order could not be placed"
            );
            return match self.stripe.refund_charge(&charge.id).await {
                Ok(_) => Err(PaymentError::Refunded(e)),
                Err(refund_err) => {
                    tracing::error!(
                        charge_id = %charge.id,
                        error = %refund_err,
                        "Refund of unplaced order failed"
                    );
                    Err(PaymentError::Repository(e))
                }
            };
        }

        tracing::info!(order_id = %order.id, reference = %reference_code, "Order placed");
        Ok(reference_code)
    }

    async fn charge(
        &self,
        order: &Order,
        amount: i64,
        source: ChargeSource<'_>,
        description: &str,
    ) -> Result<stripe::Charge, StripeError> {
        let key = charge_key(order.id, amount, &source);
        self.stripe
            .create_charge(amount, source, description, &key)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use wardrobe_core::CurrencyCode;

    use super::*;

    fn form(token: Option<&str>, save: bool, use_default: bool) -> PaymentForm {
        PaymentForm {
            stripe_token: token.map(str::to_owned),
            save,
            use_default,
        }
    }

    #[test]
    fn test_plan_plain_token() {
        let f = form(Some("tok_visa"), false, false);
        assert_eq!(plan_payment(&f, Some("cus_1")).unwrap(), PaymentPlan::Token("tok_visa"));
    }

    #[test]
    fn test_plan_save_without_customer_creates_one() {
        let f = form(Some("tok_visa"), true, false);
        assert_eq!(
            plan_payment(&f, None).unwrap(),
            PaymentPlan::SaveNewCustomer { token: "tok_visa" }
        );
        assert_eq!(
            plan_payment(&f, Some("")).unwrap(),
            PaymentPlan::SaveNewCustomer { token: "tok_visa" }
        );
    }

    #[test]
    fn test_plan_save_with_customer_attaches_card() {
        let f = form(Some("tok_visa"), true, false);
        assert_eq!(
            plan_payment(&f, Some("cus_1")).unwrap(),
            PaymentPlan::SaveCardToCustomer {
                customer: "cus_1",
                token: "tok_visa"
            }
        );
    }

    #[test]
    fn test_plan_use_default() {
        let f = form(None, false, true);
        assert_eq!(
            plan_payment(&f, Some("cus_1")).unwrap(),
            PaymentPlan::SavedCustomer("cus_1")
        );
        assert!(matches!(plan_payment(&f, None), Err(PaymentError::NoSavedCard)));
    }

    #[test]
    fn test_plan_requires_token() {
        let f = form(None, false, false);
        assert!(matches!(plan_payment(&f, None), Err(PaymentError::MissingToken)));
        let f = form(Some("   "), true, false);
        assert!(matches!(plan_payment(&f, None), Err(PaymentError::MissingToken)));
    }

    #[test]
    fn test_chargeable_amount() {
        let total = Decimal::from_str("19.995").unwrap();
        assert_eq!(chargeable_amount(total, CurrencyCode::Usd).unwrap(), 2000);
        assert!(matches!(
            chargeable_amount(Decimal::ZERO, CurrencyCode::Usd),
            Err(PaymentError::ZeroTotal)
        ));
    }

    fn cart(billing: Option<i32>) -> Order {
        Order {
            id: OrderId::new(7),
            user_id: wardrobe_core::UserId::new(3),
            reference_code: None,
            start_date: chrono::Utc::now(),
            ordered_date: None,
            ordered: false,
            shipping_address_id: billing.map(wardrobe_core::AddressId::new),
            billing_address_id: billing.map(wardrobe_core::AddressId::new),
            payment_id: None,
            coupon_id: None,
            being_delivered: false,
            received: false,
            refund_requested: false,
            refund_granted: false,
        }
    }

    #[test]
    fn test_payment_requires_billing_address() {
        let err = ready_to_pay(&cart(None)).unwrap_err();
        assert!(matches!(err, PaymentError::NoBillingAddress));
        assert_eq!(err.user_message(), "You have not added a billing address.");
        assert_eq!(err.retry_path(), "/checkout");
        assert!(ready_to_pay(&cart(Some(11))).is_ok());
    }

    #[test]
    fn test_retry_paths() {
        assert_eq!(PaymentError::NoActiveOrder.retry_path(), "/");
        assert_eq!(PaymentError::ZeroTotal.retry_path(), "/payment/stripe");
        assert_eq!(
            PaymentError::Gateway(StripeError::RateLimit).retry_path(),
            "/payment/stripe"
        );
    }

    #[test]
    fn test_charge_key_follows_order_amount_and_card() {
        let key = charge_key(OrderId::new(7), 2000, &ChargeSource::Token("tok_a"));
        assert_eq!(key, "order-7-2000-tok_a");
        assert_eq!(
            key,
            charge_key(OrderId::new(7), 2000, &ChargeSource::Token("tok_a"))
        );
        assert_ne!(
            key,
            charge_key(OrderId::new(7), 2500, &ChargeSource::Token("tok_a"))
        );
        assert_ne!(
            key,
            charge_key(OrderId::new(7), 2000, &ChargeSource::Token("tok_b"))
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            PaymentError::ZeroTotal.user_message(),
            "Your order total must be greater than zero."
        );
        assert_eq!(
            PaymentError::NoSavedCard.user_message(),
            "You do not have a saved card."
        );
        assert_eq!(
            PaymentError::Gateway(StripeError::RateLimit).user_message(),
            "Rate limit error."
        );
    }
}
