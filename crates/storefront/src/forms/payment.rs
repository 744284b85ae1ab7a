//! Stripe payment form.

use serde::Deserialize;

use super::checkbox;

/// Payment form posted by the Stripe payment page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    /// Single-use card token created by Stripe.js.
    #[serde(default, rename = "stripeToken")]
    pub stripe_token: Option<String>,
    /// Save the card for future purchases.
    #[serde(default, deserialize_with = "checkbox")]
    pub save: bool,
    /// Pay with the saved card.
    #[serde(default, deserialize_with = "checkbox")]
    pub use_default: bool,
}

impl PaymentForm {
    /// The card token, if a non-blank one was submitted.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.stripe_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
