//! MiDinero Core Library
//!
//! Shared functionality for the MiDinero finance dashboard:
//! - Database access and migrations
//! - CSV transaction import
//! - Dashboard analytics (overview, trends, categories, spending patterns)
//! - Expense trend estimation and next-month prediction
//! - Budget health evaluation

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod money;

/// Seeded databases for tests in this and dependent crates
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::Dashboard;
pub use config::Config;
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
