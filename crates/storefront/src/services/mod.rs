//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Email/password accounts (argon2)
//! - `payment` - Stripe client and order payment
//! - `reference` - Order reference codes

pub mod auth;
pub mod payment;
pub mod reference;
