//! Record types mirroring the `shop` schema.
//!
//! These are plain data carriers. Repositories in the `storefront` and
//! `admin` crates read them with `sqlx::FromRow` (behind the `postgres`
//! feature); business rules live in [`crate::pricing`] and [`crate::cart`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{self, LinePrice};
use crate::types::{
    AddressId, AddressKind, CategoryId, CountryCode, CouponId, Email, ItemId, ItemLabel,
    OrderId, OrderItemId, OrderStage, PaymentId, RefundId, UserId,
};

/// A label grouping products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub category_id: CategoryId,
    pub label: ItemLabel,
    pub slug: String,
    pub description: String,
    /// Units in stock.
    pub quantity: i32,
    /// Media path or URL of the product image.
    pub image: String,
}

impl Item {
    /// Price the customer pays for one unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

/// A cart or order line joined with the item it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub quantity: i32,
    pub ordered: bool,
    pub item_title: String,
    pub item_slug: String,
    pub item_image: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
}

impl OrderLine {
    /// Price inputs of this line.
    #[must_use]
    pub const fn pricing(&self) -> LinePrice {
        LinePrice::new(self.quantity, self.price, self.discount_price)
    }
}

/// A user's cart (`ordered == false`) or confirmed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub reference_code: Option<String>,
    pub start_date: DateTime<Utc>,
    pub ordered_date: Option<DateTime<Utc>>,
    pub ordered: bool,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
    pub payment_id: Option<PaymentId>,
    pub coupon_id: Option<CouponId>,
    pub being_delivered: bool,
    pub received: bool,
    pub refund_requested: bool,
    pub refund_granted: bool,
}

impl Order {
    /// Display stage derived from the status flags.
    #[must_use]
    pub const fn stage(&self) -> OrderStage {
        OrderStage::from_flags(
            self.ordered,
            self.being_delivered,
            self.received,
            self.refund_requested,
            self.refund_granted,
        )
    }
}

/// An order's lines plus its coupon, ready for totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub coupon: Option<Coupon>,
}

impl OrderSummary {
    /// Sum of line final prices before the coupon.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(self.lines.iter().map(OrderLine::pricing))
    }

    /// Total the customer pays.
    #[must_use]
    pub fn total(&self) -> Decimal {
        pricing::order_total(
            self.lines.iter().map(OrderLine::pricing),
            self.coupon.as_ref().map(|c| c.amount),
        )
    }

    /// Total saved through item discounts.
    #[must_use]
    pub fn saved(&self) -> Decimal {
        pricing::total_saved(self.lines.iter().map(OrderLine::pricing))
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

/// A user-owned billing or shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub street_address: String,
    pub apartment_address: String,
    pub country: CountryCode,
    pub zip: String,
    pub kind: AddressKind,
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering for summaries and admin lists.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut out = self.street_address.clone();
        if !self.apartment_address.is_empty() {
            out.push_str(", ");
            out.push_str(&self.apartment_address);
        }
        out.push_str(", ");
        out.push_str(&self.zip);
        out.push_str(", ");
        out.push_str(self.country.name());
        out
    }
}

/// A captured charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: PaymentId,
    pub stripe_charge_id: String,
    pub user_id: Option<UserId>,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A flat-amount discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub amount: Decimal,
}

/// A refund request tied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Refund {
    pub id: RefundId,
    pub order_id: OrderId,
    pub reason: String,
    pub accepted: bool,
    pub email: Email,
}

/// Payment-provider data attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct UserProfile {
    pub user_id: UserId,
    pub stripe_customer_id: Option<String>,
    pub one_click_purchasing: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn line(quantity: i32, price: &str, discount: Option<&str>) -> OrderLine {
        OrderLine {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            item_id: ItemId::new(1),
            quantity,
            ordered: false,
            item_title: "Linen shirt".to_string(),
            item_slug: "linen-shirt".to_string(),
            item_image: String::new(),
            price: Decimal::from_str(price).unwrap(),
            discount_price: discount.map(|d| Decimal::from_str(d).unwrap()),
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = OrderSummary {
            lines: vec![line(2, "20.00", Some("15.00")), line(1, "9.99", None)],
            coupon: Some(Coupon {
                id: CouponId::new(1),
                code: "SPRING".to_string(),
                amount: Decimal::from(5),
            }),
        };
        assert_eq!(summary.subtotal(), Decimal::from_str("39.99").unwrap());
        assert_eq!(summary.total(), Decimal::from_str("34.99").unwrap());
        assert_eq!(summary.saved(), Decimal::from(10));
        assert_eq!(summary.item_count(), 3);
    }

    #[test]
    fn test_address_one_line() {
        let address = Address {
            id: AddressId::new(1),
            user_id: UserId::new(1),
            street_address: "12 Baker St".to_string(),
            apartment_address: "Apt 3".to_string(),
            country: CountryCode::parse("GB").unwrap(),
            zip: "NW1".to_string(),
            kind: AddressKind::Shipping,
            is_default: false,
        };
        assert_eq!(address.one_line(), "12 Baker St, Apt 3, NW1, United Kingdom");
    }

    #[test]
    fn test_item_effective_price() {
        let mut item = Item {
            id: ItemId::new(1),
            title: "Coat".to_string(),
            price: Decimal::from(100),
            discount_price: None,
            category_id: CategoryId::new(1),
            label: ItemLabel::New,
            slug: "coat".to_string(),
            description: String::new(),
            quantity: 1,
            image: String::new(),
        };
        assert_eq!(item.effective_price(), Decimal::from(100));
        item.discount_price = Some(Decimal::from(80));
        assert_eq!(item.effective_price(), Decimal::from(80));
    }
}
