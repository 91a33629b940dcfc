//! NestMate household organizer
//!
//! The backend core for a multi-user household organizer: families with
//! per-category sharing controls, user-owned calendar events, shopping
//! lists, meal plans, medications and documents, and the aggregated "today"
//! dashboard built on top of them. Persistence sits behind store traits with
//! Postgres and in-memory backends.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{NestMateError, Result};

// Re-export main components for easy access
pub use database::Stores;
pub use services::{AuthContext, DashboardView, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
