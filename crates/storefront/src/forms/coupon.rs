//! Coupon code form.

use serde::Deserialize;

/// Maximum coupon code length.
pub const MAX_CODE_LENGTH: usize = 15;

/// Coupon form on the checkout page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

impl CouponForm {
    /// The trimmed code, or the message to show when it cannot be a coupon.
    ///
    /// # Errors
    ///
    /// Returns a message when the code is blank or longer than a coupon code can be.
    pub fn validate(&self) -> Result<&str, &'static str> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err("Please enter a coupon code.");
        }
        if code.chars().count() > MAX_CODE_LENGTH {
            return Err("This coupon does not exist.");
        }
        Ok(code)
    }
}
