//! Typed form inputs.
//!
//! Each form is deserialized from an urlencoded body with `serde` and then
//! validated into a typed value or a message for the customer.

pub mod auth;
pub mod checkout;
pub mod coupon;
pub mod payment;
pub mod refund;

use serde::{Deserialize, Deserializer};

pub use auth::{LoginForm, SignupForm};
pub use checkout::{CheckoutError, CheckoutForm, CheckoutPlan, SavedDefaults};
pub use coupon::CouponForm;
pub use payment::PaymentForm;
pub use refund::{RefundForm, RefundRequest};

/// Deserialize an HTML checkbox.
///
/// Browsers omit unchecked boxes and send `on` (or the box's `value`) for
/// checked ones; combine with `#[serde(default)]`.
pub(crate) fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        )
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Boxes {
        #[serde(default, deserialize_with = "checkbox")]
        a: bool,
        #[serde(default, deserialize_with = "checkbox")]
        b: bool,
        #[serde(default, deserialize_with = "checkbox")]
        c: bool,
    }

    #[test]
    fn test_checkbox_semantics() {
        let boxes: Boxes = serde_json::from_str(r#"{"a": "on", "b": "false"}"#).unwrap();
        assert!(boxes.a);
        assert!(!boxes.b);
        assert!(!boxes.c);
    }
}
