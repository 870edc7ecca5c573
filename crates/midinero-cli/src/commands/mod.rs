//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `budgets` - Budget commands (set, list)
//! - `core` - Core commands (init) and shared utilities (open_db, resolve_user)
//! - `goals` - Savings goal commands (set, add, list)
//! - `import` - CSV transaction import
//! - `reports` - Dashboard report commands
//! - `serve` - Web server command
//! - `users` - User commands (add, list)

pub mod budgets;
pub mod core;
pub mod goals;
pub mod import;
pub mod reports;
pub mod serve;
pub mod users;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use goals::*;
pub use import::*;
pub use reports::*;
pub use serve::*;
pub use users::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
