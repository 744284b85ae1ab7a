//! Login and signup forms.

use serde::Deserialize;

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Path to return to after login.
    #[serde(default)]
    pub next: Option<String>,
}

/// Signup form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl SignupForm {
    /// Check the fields that don't need the database.
    ///
    /// # Errors
    ///
    /// Returns a message when the two passwords differ.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.password != self.password_confirm {
            return Err("The two password fields didn't match.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_password_mismatch() {
        let form = SignupForm {
            email: "a@b.co".to_owned(),
            password: "first password".to_owned(),
            password_confirm: "second password".to_owned(),
        };
        assert!(form.validate().is_err());
    }
}
