//! Display models handed to templates.
//!
//! Prices leave the database as bare decimals; these views pair them with
//! the shop currency so templates only ever print formatted [`Money`].

use rust_decimal::Decimal;

use wardrobe_core::models::{Address, Item, OrderLine, OrderSummary};
use wardrobe_core::{CurrencyCode, Money};

/// Product as shown in listings and on its detail page.
#[derive(Debug, Clone)]
pub struct ItemView {
    pub title: String,
    pub slug: String,
    pub image: String,
    pub description: String,
    pub label: &'static str,
    pub badge: &'static str,
    pub price: Money,
    pub discount_price: Option<Money>,
}

impl ItemView {
    #[must_use]
    pub fn new(item: &Item, currency: CurrencyCode) -> Self {
        Self {
            title: item.title.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            description: item.description.clone(),
            label: item.label.title(),
            badge: item.label.badge(),
            price: Money::new(item.price, currency),
            discount_price: item.discount_price.map(|d| Money::new(d, currency)),
        }
    }
}

/// One cart line with its computed totals.
#[derive(Debug, Clone)]
pub struct LineView {
    pub title: String,
    pub slug: String,
    pub image: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub total_item_price: Money,
    pub total_discount_price: Option<Money>,
    pub amount_saved: Option<Money>,
    pub final_price: Money,
}

impl LineView {
    #[must_use]
    pub fn new(line: &OrderLine, currency: CurrencyCode) -> Self {
        let pricing = line.pricing();
        let saved = pricing.amount_saved();
        Self {
            title: line.item_title.clone(),
            slug: line.item_slug.clone(),
            image: line.item_image.clone(),
            quantity: line.quantity,
            unit_price: Money::new(line.price, currency),
            total_item_price: Money::new(pricing.total_item_price(), currency),
            total_discount_price: pricing
                .total_discount_price()
                .map(|d| Money::new(d, currency)),
            amount_saved: (saved > Decimal::ZERO).then(|| Money::new(saved, currency)),
            final_price: Money::new(pricing.final_price(), currency),
        }
    }
}

/// An order's lines and totals.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub lines: Vec<LineView>,
    pub coupon_code: Option<String>,
    pub coupon_amount: Option<Money>,
    pub subtotal: Money,
    pub saved: Option<Money>,
    pub total: Money,
    pub item_count: i64,
}

impl SummaryView {
    #[must_use]
    pub fn new(summary: &OrderSummary, currency: CurrencyCode) -> Self {
        let saved = summary.saved();
        Self {
            lines: summary
                .lines
                .iter()
                .map(|line| LineView::new(line, currency))
                .collect(),
            coupon_code: summary.coupon.as_ref().map(|c| c.code.clone()),
            coupon_amount: summary
                .coupon
                .as_ref()
                .map(|c| Money::new(c.amount, currency)),
            subtotal: Money::new(summary.subtotal(), currency),
            saved: (saved > Decimal::ZERO).then(|| Money::new(saved, currency)),
            total: Money::new(summary.total(), currency),
            item_count: summary.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A saved address offered on the checkout form.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub one_line: String,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            one_line: address.one_line(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use wardrobe_core::models::Coupon;
    use wardrobe_core::{CouponId, ItemId, OrderId, OrderItemId};

    use super::*;

    fn line(quantity: i32, price: &str, discount: Option<&str>) -> OrderLine {
        OrderLine {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            item_id: ItemId::new(1),
            quantity,
            ordered: false,
            item_title: "Denim jacket".to_owned(),
            item_slug: "denim-jacket".to_owned(),
            item_image: "/media/denim.jpg".to_owned(),
            price: Decimal::from_str(price).unwrap(),
            discount_price: discount.map(|d| Decimal::from_str(d).unwrap()),
        }
    }

    #[test]
    fn test_summary_view_formats_totals() {
        let summary = OrderSummary {
            lines: vec![line(2, "40.00", Some("30.00")), line(1, "15.50", None)],
            coupon: Some(Coupon {
                id: CouponId::new(1),
                code: "SPRING".to_owned(),
                amount: Decimal::from(5),
            }),
        };
        let view = SummaryView::new(&summary, CurrencyCode::Usd);

        assert_eq!(view.subtotal.to_string(), "$75.50");
        assert_eq!(view.total.to_string(), "$70.50");
        assert_eq!(view.saved.unwrap().to_string(), "$20.00");
        assert_eq!(view.coupon_code.as_deref(), Some("SPRING"));
        assert_eq!(view.item_count, 3);

        let discounted = &view.lines[0];
        assert_eq!(discounted.total_item_price.to_string(), "$80.00");
        assert_eq!(discounted.final_price.to_string(), "$60.00");
        assert!(view.lines[1].amount_saved.is_none());
    }

    #[test]
    fn test_empty_summary() {
        let view = SummaryView::new(&OrderSummary::default(), CurrencyCode::Gbp);
        assert!(view.is_empty());
        assert_eq!(view.total.to_string(), "£0.00");
        assert!(view.saved.is_none());
    }
}
