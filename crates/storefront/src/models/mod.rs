//! Domain models for the storefront.
//!
//! Shop records (items, orders, addresses) come from `wardrobe_core::models`;
//! this module holds the storefront-only types.

pub mod session;
pub mod user;

pub use session::{CurrentUser, FlashLevel, FlashMessage, keys as session_keys};
pub use user::User;
