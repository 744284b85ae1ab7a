//! Wardrobe Admin library.
//!
//! The staff back office for the shop: catalog editing, order and refund
//! handling, and read-only customer records. It shares the storefront's
//! `PostgreSQL` database and is served on its own port.
//!
//! # Security
//!
//! Every page except the login form requires a user with the `is_staff`
//! flag. Bind it to a private interface; it has write access to the whole
//! catalog and every order.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
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
