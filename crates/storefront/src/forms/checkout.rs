//! Checkout form.
//!
//! The form is validated completely into a [`CheckoutPlan`] before anything is
//! written; `OrderRepository::apply_checkout` then applies the plan in one
//! transaction.

use serde::Deserialize;
use thiserror::Error;

use wardrobe_core::models::Address;
use wardrobe_core::{CountryCode, PaymentOption};

use super::checkbox;
use crate::db::addresses::{BillingChoice, NewAddress, ShippingChoice};

/// Longest accepted address line or zip.
const MAX_FIELD_LENGTH: usize = 100;

/// Raw checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_address2: String,
    #[serde(default)]
    pub shipping_country: String,
    #[serde(default)]
    pub shipping_zip: String,

    #[serde(default)]
    pub billing_address: String,
    #[serde(default)]
    pub billing_address2: String,
    #[serde(default)]
    pub billing_country: String,
    #[serde(default)]
    pub billing_zip: String,

    #[serde(default, deserialize_with = "checkbox")]
    pub same_billing_address: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub set_default_shipping: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub use_default_shipping: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub set_default_billing: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub use_default_billing: bool,

    #[serde(default)]
    pub payment_option: String,
}

/// The user's saved default addresses.
#[derive(Debug, Clone, Default)]
pub struct SavedDefaults {
    pub shipping: Option<Address>,
    pub billing: Option<Address>,
}

/// A fully validated checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub shipping: ShippingChoice,
    pub billing: BillingChoice,
    pub payment_option: PaymentOption,
}

/// Why a checkout form was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("No default shipping address available.")]
    NoDefaultShipping,
    #[error("Please fill in the required shipping address fields.")]
    MissingShippingFields,
    #[error("No default billing address available.")]
    NoDefaultBilling,
    #[error("Please fill in the required billing address fields.")]
    MissingBillingFields,
    #[error("Please select a valid country.")]
    InvalidCountry,
    #[error("Address fields must be at most 100 characters.")]
    FieldTooLong,
    #[error("Invalid payment option selected.")]
    InvalidPaymentOption,
}

impl CheckoutForm {
    /// Validate the form against the user's saved defaults.
    ///
    /// # Errors
    ///
    /// Returns the first `CheckoutError` found, checking shipping, then
    /// billing, then the payment option.
    pub fn validate(&self, defaults: &SavedDefaults) -> Result<CheckoutPlan, CheckoutError> {
        let shipping = if self.use_default_shipping {
            let address = defaults
                .shipping
                .as_ref()
                .ok_or(CheckoutError::NoDefaultShipping)?;
            ShippingChoice::Existing(address.id)
        } else {
            ShippingChoice::New(new_address(
                AddressFields {
                    street: &self.shipping_address,
                    apartment: &self.shipping_address2,
                    country: &self.shipping_country,
                    zip: &self.shipping_zip,
                },
                self.set_default_shipping,
                CheckoutError::MissingShippingFields,
            )?)
        };

        let billing = if self.same_billing_address {
            BillingChoice::SameAsShipping {
                is_default: self.set_default_billing,
            }
        } else if self.use_default_billing {
            let address = defaults
                .billing
                .as_ref()
                .ok_or(CheckoutError::NoDefaultBilling)?;
            BillingChoice::Existing(address.id)
        } else {
            BillingChoice::New(new_address(
                AddressFields {
                    street: &self.billing_address,
                    apartment: &self.billing_address2,
                    country: &self.billing_country,
                    zip: &self.billing_zip,
                },
                self.set_default_billing,
                CheckoutError::MissingBillingFields,
            )?)
        };

        let payment_option = PaymentOption::from_form_value(&self.payment_option)
            .ok_or(CheckoutError::InvalidPaymentOption)?;

        Ok(CheckoutPlan {
            shipping,
            billing,
            payment_option,
        })
    }
}

struct AddressFields<'a> {
    street: &'a str,
    apartment: &'a str,
    country: &'a str,
    zip: &'a str,
}

fn new_address(
    fields: AddressFields<'_>,
    is_default: bool,
    missing: CheckoutError,
) -> Result<NewAddress, CheckoutError> {
    let street = fields.street.trim();
    let apartment = fields.apartment.trim();
    let country = fields.country.trim();
    let zip = fields.zip.trim();

    if street.is_empty() || country.is_empty() || zip.is_empty() {
        return Err(missing);
    }
    if [street, apartment, zip]
        .iter()
        .any(|f| f.chars().count() > MAX_FIELD_LENGTH)
    {
        return Err(CheckoutError::FieldTooLong);
    }
    let country = CountryCode::parse(country).map_err(|_| CheckoutError::InvalidCountry)?;

    Ok(NewAddress {
        street_address: street.to_owned(),
        apartment_address: apartment.to_owned(),
        country,
        zip: zip.to_owned(),
        is_default,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wardrobe_core::{AddressId, AddressKind, UserId};

    use super::*;

    fn saved(id: i32, kind: AddressKind) -> Address {
        Address {
            id: AddressId::new(id),
            user_id: UserId::new(1),
            street_address: "1 Main St".to_owned(),
            apartment_address: String::new(),
            country: CountryCode::parse("US").unwrap(),
            zip: "10001".to_owned(),
            kind,
            is_default: true,
        }
    }

    fn filled() -> CheckoutForm {
        CheckoutForm {
            shipping_address: "221B Baker Street".to_owned(),
            shipping_country: "gb".to_owned(),
            shipping_zip: "NW1 6XE".to_owned(),
            billing_address: "1 Main St".to_owned(),
            billing_country: "US".to_owned(),
            billing_zip: "10001".to_owned(),
            payment_option: "S".to_owned(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_new_addresses() {
        let plan = filled().validate(&SavedDefaults::default()).unwrap();
        let ShippingChoice::New(shipping) = plan.shipping else {
            panic!("expected a new shipping address");
        };
        assert_eq!(shipping.country.as_str(), "GB");
        assert!(!shipping.is_default);
        assert!(matches!(plan.billing, BillingChoice::New(_)));
        assert_eq!(plan.payment_option, PaymentOption::Stripe);
    }

    #[test]
    fn test_use_default_shipping_requires_saved_address() {
        let mut form = filled();
        form.use_default_shipping = true;
        assert_eq!(
            form.validate(&SavedDefaults::default()),
            Err(CheckoutError::NoDefaultShipping)
        );

        let defaults = SavedDefaults {
            shipping: Some(saved(7, AddressKind::Shipping)),
            billing: None,
        };
        let plan = form.validate(&defaults).unwrap();
        assert_eq!(plan.shipping, ShippingChoice::Existing(AddressId::new(7)));
    }

    #[test]
    fn test_missing_shipping_fields() {
        let mut form = filled();
        form.shipping_zip = "  ".to_owned();
        assert_eq!(
            form.validate(&SavedDefaults::default()),
            Err(CheckoutError::MissingShippingFields)
        );
    }

    #[test]
    fn test_same_billing_address_ignores_billing_fields() {
        let mut form = filled();
        form.same_billing_address = true;
        form.set_default_billing = true;
        form.billing_address.clear();
        let plan = form.validate(&SavedDefaults::default()).unwrap();
        assert_eq!(plan.billing, BillingChoice::SameAsShipping { is_default: true });
    }

    #[test]
    fn test_use_default_billing() {
        let mut form = filled();
        form.use_default_billing = true;
        assert_eq!(
            form.validate(&SavedDefaults::default()),
            Err(CheckoutError::NoDefaultBilling)
        );

        let defaults = SavedDefaults {
            shipping: None,
            billing: Some(saved(3, AddressKind::Billing)),
        };
        assert_eq!(
            form.validate(&defaults).unwrap().billing,
            BillingChoice::Existing(AddressId::new(3))
        );
    }

    #[test]
    fn test_missing_billing_fields() {
        let mut form = filled();
        form.billing_country.clear();
        assert_eq!(
            form.validate(&SavedDefaults::default()),
            Err(CheckoutError::MissingBillingFields)
        );
    }

    #[test]
    fn test_invalid_country_and_payment_option() {
        let mut form = filled();
        form.shipping_country = "XX".to_owned();
        assert_eq!(
            form.validate(&SavedDefaults::default()),
            Err(CheckoutError::InvalidCountry)
        );

        let mut form = filled();
        form.payment_option = "B".to_owned();
        assert_eq!(
            form.validate(&SavedDefaults::default()),
            Err(CheckoutError::InvalidPaymentOption)
        );
    }

    #[test]
    fn test_set_default_shipping_marks_new_address() {
        let mut form = filled();
        form.set_default_shipping = true;
        let plan = form.validate(&SavedDefaults::default()).unwrap();
        assert!(matches!(plan.shipping, ShippingChoice::New(ref a) if a.is_default));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CheckoutError::NoDefaultShipping.to_string(),
            "No default shipping address available."
        );
        assert_eq!(
            CheckoutError::InvalidPaymentOption.to_string(),
            "Invalid payment option selected."
        );
    }
}
