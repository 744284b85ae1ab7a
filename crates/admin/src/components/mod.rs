//! Reusable view components for admin pages.

pub mod data_table;
