//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during staff login.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] wardrobe_core::EmailError),

    /// Unknown email, wrong password, or an account without staff access.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AdminAuthError {
    /// Message shown on the login form.
    ///
    /// Non-staff accounts get the same answer as a wrong password.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) | Self::InvalidCredentials => {
                "Please enter the correct email address and password for a staff account."
            }
            Self::Repository(_) => "Something went wrong. Please try again.",
        }
    }
}
