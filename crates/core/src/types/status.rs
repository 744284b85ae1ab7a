//! Status and choice enums for shop records.

use serde::{Deserialize, Serialize};

/// Merchandising label shown next to an item's title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.item_label", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ItemLabel {
    /// Newly arrived.
    #[default]
    New,
    /// Seasonal collection.
    Season,
    /// On sale.
    Sale,
}

impl ItemLabel {
    /// All labels, in display order.
    pub const ALL: [Self; 3] = [Self::New, Self::Season, Self::Sale];

    /// Human-readable label text.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Season => "Season",
            Self::Sale => "Sale",
        }
    }

    /// Badge style used by the templates.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::New => "primary",
            Self::Season => "secondary",
            Self::Sale => "danger",
        }
    }

    /// Stable string value used in forms and YAML.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Season => "season",
            Self::Sale => "sale",
        }
    }
}

impl std::str::FromStr for ItemLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "season" => Ok(Self::Season),
            "sale" => Ok(Self::Sale),
            _ => Err(format!("invalid item label: {s}")),
        }
    }
}

/// Whether an address is used for billing or shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.address_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Billing,
    Shipping,
}

impl AddressKind {
    /// Single-letter code (`B` / `S`).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Billing => 'B',
            Self::Shipping => 'S',
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Billing => "Billing",
            Self::Shipping => "Shipping",
        }
    }
}

/// Payment method chosen on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentOption {
    /// Card payment through Stripe (form value `S`).
    #[serde(rename = "S")]
    Stripe,
    /// PayPal (form value `P`).
    #[serde(rename = "P")]
    PayPal,
}

impl PaymentOption {
    /// Parse the checkout form value.
    #[must_use]
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value.trim() {
            "S" => Some(Self::Stripe),
            "P" => Some(Self::PayPal),
            _ => None,
        }
    }

    /// Path segment of the payment page (`/payment/{slug}`).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::PayPal => "paypal",
        }
    }
}

/// Display stage of an order, derived from its status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    Cart,
    Placed,
    BeingDelivered,
    Received,
    RefundRequested,
    RefundGranted,
}

impl OrderStage {
    /// Derive the stage from an order's flags. Later stages win.
    #[must_use]
    pub const fn from_flags(
        ordered: bool,
        being_delivered: bool,
        received: bool,
        refund_requested: bool,
        refund_granted: bool,
    ) -> Self {
        if refund_granted {
            Self::RefundGranted
        } else if refund_requested {
            Self::RefundRequested
        } else if received {
            Self::Received
        } else if being_delivered {
            Self::BeingDelivered
        } else if ordered {
            Self::Placed
        } else {
            Self::Cart
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::Placed => "Placed",
            Self::BeingDelivered => "Being delivered",
            Self::Received => "Received",
            Self::RefundRequested => "Refund requested",
            Self::RefundGranted => "Refund granted",
        }
    }
}

impl std::fmt::Display for OrderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_label_badges() {
        assert_eq!(ItemLabel::New.badge(), "primary");
        assert_eq!(ItemLabel::Season.badge(), "secondary");
        assert_eq!(ItemLabel::Sale.badge(), "danger");
    }

    #[test]
    fn test_item_label_parse_roundtrip() {
        for label in ItemLabel::ALL {
            assert_eq!(label.as_str().parse::<ItemLabel>(), Ok(label));
        }
        assert!("clearance".parse::<ItemLabel>().is_err());
    }

    #[test]
    fn test_payment_option_form_values() {
        assert_eq!(PaymentOption::from_form_value("S"), Some(PaymentOption::Stripe));
        assert_eq!(PaymentOption::from_form_value("P"), Some(PaymentOption::PayPal));
        assert_eq!(PaymentOption::from_form_value("X"), None);
        assert_eq!(PaymentOption::Stripe.slug(), "stripe");
    }

    #[test]
    fn test_order_stage_precedence() {
        assert_eq!(
            OrderStage::from_flags(false, false, false, false, false),
            OrderStage::Cart
        );
        assert_eq!(
            OrderStage::from_flags(true, false, false, false, false),
            OrderStage::Placed
        );
        assert_eq!(
            OrderStage::from_flags(true, true, true, false, false),
            OrderStage::Received
        );
        assert_eq!(
            OrderStage::from_flags(true, true, true, true, false),
            OrderStage::RefundRequested
        );
        assert_eq!(
            OrderStage::from_flags(true, true, true, false, true),
            OrderStage::RefundGranted
        );
    }

    #[test]
    fn test_address_kind_codes() {
        assert_eq!(AddressKind::Billing.code(), 'B');
        assert_eq!(AddressKind::Shipping.code(), 'S');
    }
}
