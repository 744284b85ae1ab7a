//! Staff lookups for the admin login.

use sqlx::PgPool;

use wardrobe_core::Email;

use super::RepositoryError;
use crate::models::StaffUser;

/// Repository for staff account lookups.
pub struct StaffRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct StaffWithHash {
    #[sqlx(flatten)]
    user: StaffUser,
    password_hash: String,
}

impl<'a> StaffRepository<'a> {
    /// Create a new staff repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account and its password hash by email.
    ///
    /// Returns `None` if the account doesn't exist or has no password set.
    /// Non-staff accounts are returned too; the caller decides.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(StaffUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffWithHash>(
            r"
            SELECT u.id, u.email, u.is_staff, p.password_hash
            FROM shop.user u
            JOIN shop.user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }
}
