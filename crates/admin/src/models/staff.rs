//! Staff account type.

use wardrobe_core::{Email, UserId};

/// A shop account as seen by the admin login.
///
/// Staff share the `shop.user` table with customers; only accounts with
/// `is_staff` may sign in to the panel.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffUser {
    pub id: UserId,
    pub email: Email,
    pub is_staff: bool,
}
