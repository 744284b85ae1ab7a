//! Wardrobe Core - Shared types library.
//!
//! This crate provides the types and pure business rules shared by all
//! Wardrobe components:
//! - `storefront` - Public shop (catalog, cart, checkout, payment, refunds)
//! - `admin` - Staff panel for managing shop records
//! - `cli` - Command-line tools for migrations, users, and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. With the `postgres` feature the types gain `sqlx`
//! encode/decode support so repositories can bind and read them directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, money, countries, and statuses
//! - [`models`] - Record types mirroring the `shop` schema
//! - [`pricing`] - Line and order totals
//! - [`cart`] - Cart mutation outcomes
//! - [`slug`] - URL slugs for items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod models;
pub mod pricing;
pub mod slug;
pub mod types;

pub use types::*;
