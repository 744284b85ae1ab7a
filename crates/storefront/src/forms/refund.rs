//! Refund request form.

use serde::Deserialize;

use wardrobe_core::Email;

use crate::services::reference::REFERENCE_CODE_LENGTH;

/// Raw refund form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundForm {
    #[serde(default)]
    pub ref_code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub email: String,
}

/// A validated refund request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub ref_code: String,
    pub reason: String,
    pub email: Email,
}

impl RefundForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the message to show for the first invalid field.
    pub fn validate(&self) -> Result<RefundRequest, &'static str> {
        let ref_code = self.ref_code.trim();
        if ref_code.is_empty() || ref_code.chars().count() > REFERENCE_CODE_LENGTH {
            return Err("Please enter a valid order reference code.");
        }

        let reason = self.message.trim();
        if reason.is_empty() {
            return Err("Please tell us why you would like a refund.");
        }

        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address.")?;

        Ok(RefundRequest {
            ref_code: ref_code.to_owned(),
            reason: reason.to_owned(),
            email,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(ref_code: &str, message: &str, email: &str) -> RefundForm {
        RefundForm {
            ref_code: ref_code.to_owned(),
            message: message.to_owned(),
            email: email.to_owned(),
        }
    }

    #[test]
    fn test_valid_refund_form() {
        let request = form(" abc123 ", "Wrong size", "Buyer@Example.com")
            .validate()
            .unwrap();
        assert_eq!(request.ref_code, "abc123");
        assert_eq!(request.reason, "Wrong size");
        assert_eq!(request.email.as_str(), "buyer@example.com");
    }

    #[test]
    fn test_refund_form_errors() {
        assert!(form("", "reason", "a@b.co").validate().is_err());
        assert!(form(&"x".repeat(21), "reason", "a@b.co").validate().is_err());
        assert_eq!(
            form("abc", "  ", "a@b.co").validate(),
            Err("Please tell us why you would like a refund.")
        );
        assert_eq!(
            form("abc", "reason", "nope").validate(),
            Err("Please enter a valid email address.")
        );
    }
}
