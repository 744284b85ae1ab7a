//! User domain types.

use chrono::{DateTime, Utc};

use wardrobe_core::{Email, UserId};

/// A shop account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Whether the user may sign in to the admin panel.
    pub is_staff: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
