//! Admin authentication service.
//!
//! Staff sign in with the same email/password store as the storefront
//! (`shop.user_password`, Argon2id PHC strings). Only accounts flagged
//! `is_staff` are let in.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use sqlx::PgPool;

use wardrobe_core::Email;

use crate::db::staff::StaffRepository;
use crate::models::StaffUser;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    staff: StaffRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            staff: StaffRepository::new(pool),
        }
    }

    /// Log in a staff member with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the account doesn't
    /// exist, the password is wrong, or the account is not staff.
    pub async fn login(&self, email: &str, password: &str) -> Result<StaffUser, AdminAuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .staff
            .get_with_password_hash(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_staff {
            tracing::warn!(user_id = %user.id, "Non-staff account attempted admin login");
            return Err(AdminAuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

/// Verify a password against a PHC hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    use super::*;

    #[test]
    fn test_verify_password() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"staff password", &salt)
            .unwrap()
            .to_string();

        assert!(verify_password("staff password", &hash).is_ok());
        assert!(matches!(
            verify_password("guess", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_password("staff password", "garbage"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_user_message_hides_staff_check() {
        assert_eq!(
            AdminAuthError::InvalidCredentials.user_message(),
            AdminAuthError::InvalidEmail(wardrobe_core::Email::parse("nope").unwrap_err())
                .user_message()
        );
    }
}
