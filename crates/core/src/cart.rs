//! Cart mutation outcomes.
//!
//! Every cart operation ends in exactly one [`CartOutcome`], which the
//! storefront shows to the customer as a flash message.

use serde::{Deserialize, Serialize};

/// Result of adding or removing an item from a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartOutcome {
    /// A new line was added to the cart.
    Added,
    /// An existing line's quantity changed.
    QuantityUpdated,
    /// A line was removed from the cart.
    Removed,
    /// The item is not in the cart.
    NotInCart,
    /// The customer has no cart yet.
    NoActiveOrder,
}

impl CartOutcome {
    /// Message shown to the customer.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "This item was added to your cart.",
            Self::QuantityUpdated => "This item quantity was updated.",
            Self::Removed => "This item was removed from your cart.",
            Self::NotInCart => "This item was not in your cart.",
            Self::NoActiveOrder => "You do not have an active order.",
        }
    }

    /// Whether the cart actually changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Added | Self::QuantityUpdated | Self::Removed)
    }
}

/// What to do with a line when one unit is taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Keep the line with the new quantity.
    SetQuantity(i32),
    /// Delete the line.
    RemoveLine,
}

/// Decide how to take one unit out of a line holding `quantity` units.
#[must_use]
pub const fn decrement(quantity: i32) -> Decrement {
    if quantity > 1 {
        Decrement::SetQuantity(quantity - 1)
    } else {
        Decrement::RemoveLine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_keeps_line_above_one() {
        assert_eq!(decrement(3), Decrement::SetQuantity(2));
        assert_eq!(decrement(2), Decrement::SetQuantity(1));
    }

    #[test]
    fn test_decrement_removes_last_unit() {
        assert_eq!(decrement(1), Decrement::RemoveLine);
        assert_eq!(decrement(0), Decrement::RemoveLine);
    }

    #[test]
    fn test_outcome_changed() {
        assert!(CartOutcome::Added.changed());
        assert!(CartOutcome::Removed.changed());
        assert!(!CartOutcome::NotInCart.changed());
        assert!(!CartOutcome::NoActiveOrder.changed());
    }
}
