//! Database operations for the admin panel.
//!
//! The panel works on the storefront's `shop` schema directly; the tables
//! and their migrations are owned by `crates/storefront/migrations/`:
//! ```bash
//! cargo run -p wardrobe-cli -- migrate
//! ```
//!
//! Staff sessions share the `tower_sessions.session` table with the
//! storefront under a different cookie name.

pub mod categories;
pub mod coupons;
pub mod dashboard;
pub mod items;
pub mod orders;
pub mod records;
pub mod refunds;
pub mod staff;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use dashboard::DashboardRepository;
pub use items::ItemRepository;
pub use orders::OrderRepository;
pub use records::RecordRepository;
pub use refunds::RefundRepository;
pub use staff::StaffRepository;

/// Rows shown per list page.
pub const PER_PAGE: i64 = 50;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// A window into a list, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub per_page: i64,
}

impl Paging {
    /// Paging for the requested page; missing or non-positive pages mean page 1.
    #[must_use]
    pub fn new(page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: PER_PAGE,
        }
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Whether a page follows this one.
    #[must_use]
    pub const fn has_next(&self, total: i64) -> bool {
        self.page * self.per_page < total
    }
}

/// `ILIKE` pattern matching `term` anywhere, or `None` for a blank search.
///
/// `%`, `_` and `\` in the term match literally.
#[must_use]
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging() {
        let first = Paging::new(None);
        assert_eq!(first.offset(), 0);
        assert!(first.has_next(PER_PAGE + 1));
        assert!(!first.has_next(PER_PAGE));

        let third = Paging::new(Some(3));
        assert_eq!(third.offset(), 2 * PER_PAGE);
        assert_eq!(Paging::new(Some(-4)).page, 1);
    }

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(Some(" shirt ")).as_deref(), Some("%shirt%"));
        assert_eq!(search_pattern(Some("50%_off")).as_deref(), Some("%50\\%\\_off%"));
    }
}
