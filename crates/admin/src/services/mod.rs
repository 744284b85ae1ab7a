//! Business logic services for admin.
//!
//! - `auth` - Staff password login

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
