//! Admin form payloads and their validation.
//!
//! Forms deserialize as raw strings so an invalid submission can be shown
//! again with the staff member's input intact.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use wardrobe_core::models::{Category, Coupon, Item};
use wardrobe_core::slug::slugify;
use wardrobe_core::{CategoryId, ItemLabel, OrderId};

use crate::db::items::ItemInput;

const MAX_TITLE_LENGTH: usize = 100;
const MAX_SLUG_LENGTH: usize = 120;
const MAX_COUPON_CODE_LENGTH: usize = 15;
/// Largest amount a `NUMERIC(9, 2)` column holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Category create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub title: String,
}

impl CategoryForm {
    /// Validate into the trimmed title.
    ///
    /// # Errors
    ///
    /// Returns the problems found, one message per field.
    pub fn validate(&self) -> Result<String, Vec<String>> {
        let title = self.title.trim();
        match required(title, "Title", MAX_TITLE_LENGTH) {
            Ok(()) => Ok(title.to_owned()),
            Err(e) => Err(vec![e]),
        }
    }
}

/// Coupon create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub amount: String,
}

impl CouponForm {
    /// Validate into the code and the discount amount.
    ///
    /// # Errors
    ///
    /// Returns the problems found, one message per field.
    pub fn validate(&self) -> Result<(String, Decimal), Vec<String>> {
        let code = self.code.trim();
        let mut errors = Vec::new();

        if let Err(e) = required(code, "Code", MAX_COUPON_CODE_LENGTH) {
            errors.push(e);
        }
        let amount = parse_amount("Amount", &self.amount).map_err(|e| errors.push(e));

        match amount {
            Ok(amount) if errors.is_empty() => Ok((code.to_owned(), amount)),
            _ => Err(errors),
        }
    }
}

/// Item create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub discount_price: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub image: String,
}

impl ItemForm {
    /// Validate into an [`ItemInput`]. A blank slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns the problems found, one message per field.
    pub fn validate(&self) -> Result<ItemInput, Vec<String>> {
        let mut errors = Vec::new();
        let title = self.title.trim();

        if let Err(e) = required(title, "Title", MAX_TITLE_LENGTH) {
            errors.push(e);
        }

        let price = parse_amount("Price", &self.price).map_err(|e| errors.push(e));

        let discount_price = match self.discount_price.trim() {
            "" => Ok(None),
            raw => parse_amount("Discount price", raw)
                .map(Some)
                .map_err(|e| errors.push(e)),
        };

        let category_id = self
            .category_id
            .trim()
            .parse::<i32>()
            .map(CategoryId::new)
            .map_err(|_| errors.push("Please choose a category.".to_owned()));

        let label = ItemLabel::from_str(self.label.trim())
            .map_err(|_| errors.push("Please choose a label.".to_owned()));

        let slug = match self.slug.trim() {
            "" => slugify(title),
            given => given.to_owned(),
        };
        if slug.is_empty() {
            errors.push("Slug: enter a slug or a title with letters or digits.".to_owned());
        } else if slug.len() > MAX_SLUG_LENGTH || !is_slug(&slug) {
            errors.push(format!(
                "Slug: use at most {MAX_SLUG_LENGTH} lowercase letters, digits and hyphens."
            ));
        }

        let quantity = match self.quantity.trim() {
            "" => Ok(1),
            raw => raw
                .parse::<i32>()
                .ok()
                .filter(|q| *q >= 0)
                .ok_or_else(|| errors.push("Quantity: enter a whole number of 0 or more.".to_owned())),
        };

        match (price, discount_price, category_id, label, quantity) {
            (Ok(price), Ok(discount_price), Ok(category_id), Ok(label), Ok(quantity))
                if errors.is_empty() =>
            {
                Ok(ItemInput {
                    title: title.to_owned(),
                    price,
                    discount_price,
                    category_id,
                    label,
                    slug,
                    description: self.description.trim().to_owned(),
                    quantity,
                    image: self.image.trim().to_owned(),
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            title: category.title.clone(),
        }
    }
}

impl From<&Coupon> for CouponForm {
    fn from(coupon: &Coupon) -> Self {
        Self {
            code: coupon.code.clone(),
            amount: coupon.amount.to_string(),
        }
    }
}

impl From<&Item> for ItemForm {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            price: item.price.to_string(),
            discount_price: item.discount_price.map(|d| d.to_string()).unwrap_or_default(),
            category_id: item.category_id.to_string(),
            label: item.label.as_str().to_owned(),
            slug: item.slug.clone(),
            description: item.description.clone(),
            quantity: item.quantity.to_string(),
            image: item.image.clone(),
        }
    }
}

/// Delivery toggles on the order detail page. Unchecked boxes are absent.
#[derive(Debug, Default, Deserialize)]
pub struct DeliveryStatusForm {
    #[serde(default)]
    pub being_delivered: Option<String>,
    #[serde(default)]
    pub received: Option<String>,
}

impl DeliveryStatusForm {
    #[must_use]
    pub const fn flags(&self) -> (bool, bool) {
        (self.being_delivered.is_some(), self.received.is_some())
    }
}

/// Bulk action on selected orders.
#[derive(Debug, Deserialize)]
pub struct BulkOrdersForm {
    pub action: String,
    /// Comma-separated list of order IDs.
    #[serde(default, rename = "selected")]
    pub order_ids: String,
}

impl BulkOrdersForm {
    /// Parse the selected order IDs, ignoring empty entries.
    ///
    /// # Errors
    ///
    /// Returns the offending entry if one is not a number.
    pub fn ids(&self) -> Result<Vec<OrderId>, String> {
        self.order_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| id.parse::<i32>().map(OrderId::new).map_err(|_| id.to_owned()))
            .collect()
    }
}

fn required(value: &str, field: &str, max: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field}: this field is required."));
    }
    if value.chars().count() > max {
        return Err(format!("{field}: use at most {max} characters."));
    }
    Ok(())
}

fn parse_amount(field: &str, raw: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| format!("{field}: enter a number such as 19.99."))?;
    if amount.is_sign_negative() || amount > MAX_AMOUNT {
        return Err(format!("{field}: enter an amount between 0 and {MAX_AMOUNT}."));
    }
    if amount.scale() > 2 && amount != amount.round_dp(2) {
        return Err(format!("{field}: use at most two decimal places."));
    }
    Ok(amount.round_dp(2))
}

fn is_slug(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item_form() -> ItemForm {
        ItemForm {
            title: " Linen Shirt ".to_owned(),
            price: "49.90".to_owned(),
            category_id: "3".to_owned(),
            label: "sale".to_owned(),
            quantity: "12".to_owned(),
            ..ItemForm::default()
        }
    }

    #[test]
    fn test_item_slug_defaults_to_title() {
        let input = item_form().validate().unwrap();
        assert_eq!(input.title, "Linen Shirt");
        assert_eq!(input.slug, "linen-shirt");
        assert_eq!(input.price, Decimal::from_str("49.90").unwrap());
        assert_eq!(input.discount_price, None);
        assert_eq!(input.category_id, CategoryId::new(3));
        assert_eq!(input.label, ItemLabel::Sale);
        assert_eq!(input.quantity, 12);
    }

    #[test]
    fn test_item_explicit_slug_is_checked() {
        let mut form = item_form();
        form.slug = "Linen Shirt".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.first().unwrap().starts_with("Slug:"));

        form.slug = "linen-shirt-2".to_owned();
        assert_eq!(form.validate().unwrap().slug, "linen-shirt-2");
    }

    #[test]
    fn test_item_collects_every_error() {
        let form = ItemForm {
            price: "cheap".to_owned(),
            discount_price: "-1".to_owned(),
            label: "vintage".to_owned(),
            quantity: "many".to_owned(),
            ..ItemForm::default()
        };
        let errors = form.validate().unwrap_err();
        // title, price, discount, category, label, slug, quantity
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("Amount", "5").unwrap(), Decimal::from(5));
        assert_eq!(
            parse_amount("Amount", "5.50").unwrap(),
            Decimal::from_str("5.50").unwrap()
        );
        assert!(parse_amount("Amount", "5.555").is_err());
        assert!(parse_amount("Amount", "-0.01").is_err());
        assert!(parse_amount("Amount", "10000000").is_err());
        assert!(parse_amount("Amount", "9999999.99").is_ok());
    }

    #[test]
    fn test_coupon_form() {
        let form = CouponForm {
            code: " SPRING10 ".to_owned(),
            amount: "10".to_owned(),
        };
        assert_eq!(form.validate().unwrap(), ("SPRING10".to_owned(), Decimal::from(10)));

        let form = CouponForm {
            code: "A-VERY-LONG-COUPON".to_owned(),
            amount: "x".to_owned(),
        };
        assert_eq!(form.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_category_form() {
        assert_eq!(
            CategoryForm { title: " Shirts ".to_owned() }.validate().unwrap(),
            "Shirts"
        );
        assert!(CategoryForm::default().validate().is_err());
    }

    #[test]
    fn test_bulk_ids() {
        let form = BulkOrdersForm {
            action: "grant_refund".to_owned(),
            order_ids: "4, 7,,12".to_owned(),
        };
        assert_eq!(
            form.ids().unwrap(),
            vec![OrderId::new(4), OrderId::new(7), OrderId::new(12)]
        );

        let form = BulkOrdersForm {
            action: "grant_refund".to_owned(),
            order_ids: "4,abc".to_owned(),
        };
        assert_eq!(form.ids().unwrap_err(), "abc");
    }

    #[test]
    fn test_delivery_flags() {
        let form = DeliveryStatusForm {
            being_delivered: Some("on".to_owned()),
            received: None,
        };
        assert_eq!(form.flags(), (true, false));
    }
}
