//! Line and order totals.
//!
//! A line's final price is its discounted total when the item has a discount
//! price, otherwise its regular total. An order's total is the sum of its
//! lines' final prices minus the coupon amount, never below zero.

use rust_decimal::Decimal;

/// Price inputs of a single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    /// Number of units.
    pub quantity: i32,
    /// Regular unit price.
    pub price: Decimal,
    /// Discounted unit price, if the item is on discount.
    pub discount_price: Option<Decimal>,
}

impl LinePrice {
    /// Create line price inputs.
    #[must_use]
    pub const fn new(quantity: i32, price: Decimal, discount_price: Option<Decimal>) -> Self {
        Self {
            quantity,
            price,
            discount_price,
        }
    }

    /// `quantity × price`.
    #[must_use]
    pub fn total_item_price(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }

    /// `quantity × discount_price`, or `None` without a discount.
    #[must_use]
    pub fn total_discount_price(&self) -> Option<Decimal> {
        self.discount_price
            .map(|discount| Decimal::from(self.quantity) * discount)
    }

    /// Difference between the regular and the discounted total.
    #[must_use]
    pub fn amount_saved(&self) -> Decimal {
        self.total_discount_price()
            .map_or(Decimal::ZERO, |discounted| {
                self.total_item_price() - discounted
            })
    }

    /// Price the customer pays for this line.
    #[must_use]
    pub fn final_price(&self) -> Decimal {
        self.total_discount_price()
            .unwrap_or_else(|| self.total_item_price())
    }
}

/// Sum of the lines' final prices, before any coupon.
#[must_use]
pub fn subtotal(lines: impl IntoIterator<Item = LinePrice>) -> Decimal {
    lines.into_iter().map(|line| line.final_price()).sum()
}

/// Order total: subtotal minus the coupon amount, clamped at zero.
#[must_use]
pub fn order_total(
    lines: impl IntoIterator<Item = LinePrice>,
    coupon_amount: Option<Decimal>,
) -> Decimal {
    let total = subtotal(lines) - coupon_amount.unwrap_or(Decimal::ZERO);
    total.max(Decimal::ZERO)
}

/// Total amount saved by item discounts across all lines.
#[must_use]
pub fn total_saved(lines: impl IntoIterator<Item = LinePrice>) -> Decimal {
    lines.into_iter().map(|line| line.amount_saved()).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_without_discount() {
        let line = LinePrice::new(3, dec("10.50"), None);
        assert_eq!(line.total_item_price(), dec("31.50"));
        assert_eq!(line.total_discount_price(), None);
        assert_eq!(line.amount_saved(), Decimal::ZERO);
        assert_eq!(line.final_price(), dec("31.50"));
    }

    #[test]
    fn test_line_with_discount() {
        let line = LinePrice::new(2, dec("40.00"), Some(dec("30.00")));
        assert_eq!(line.total_item_price(), dec("80.00"));
        assert_eq!(line.total_discount_price(), Some(dec("60.00")));
        assert_eq!(line.amount_saved(), dec("20.00"));
        assert_eq!(line.final_price(), dec("60.00"));
    }

    #[test]
    fn test_order_total_applies_coupon() {
        let lines = [
            LinePrice::new(1, dec("25.00"), None),
            LinePrice::new(2, dec("40.00"), Some(dec("30.00"))),
        ];
        assert_eq!(subtotal(lines), dec("85.00"));
        assert_eq!(order_total(lines, Some(dec("5.00"))), dec("80.00"));
        assert_eq!(order_total(lines, None), dec("85.00"));
    }

    #[test]
    fn test_order_total_never_negative() {
        let lines = [LinePrice::new(1, dec("3.00"), None)];
        assert_eq!(order_total(lines, Some(dec("10.00"))), Decimal::ZERO);
    }

    #[test]
    fn test_empty_order_total_is_zero() {
        assert_eq!(order_total([], None), Decimal::ZERO);
        assert_eq!(total_saved([]), Decimal::ZERO);
    }

    #[test]
    fn test_total_saved() {
        let lines = [
            LinePrice::new(1, dec("25.00"), Some(dec("20.00"))),
            LinePrice::new(3, dec("10.00"), Some(dec("9.00"))),
        ];
        assert_eq!(total_saved(lines), dec("8.00"));
    }
}
