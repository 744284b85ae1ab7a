//! Wardrobe Storefront library.
//!
//! The public shop: catalog, cart, checkout, Stripe payment and refund
//! requests. Exposed as a library so the binary, the CLI and the
//! integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod page;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
