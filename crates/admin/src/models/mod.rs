//! Domain models for admin.
//!
//! Shop records come from `wardrobe_core::models`; this module holds the
//! staff identity and the session-stored types.

pub mod session;
pub mod staff;

pub use session::{CurrentStaff, FlashLevel, FlashMessage, keys as session_keys};
pub use staff::StaffUser;
