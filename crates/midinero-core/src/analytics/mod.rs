//! Dashboard analytics
//!
//! - `trend` - next-month expense prediction
//! - `budget` - budget health evaluation
//! - `goals` - savings goal progress
//! - `reports` - overview, trends, category breakdown and spending patterns
//! - `dashboard` - per-user composition over the database
//!
//! Everything except `dashboard` is pure and works on plain aggregates.

pub mod budget;
pub mod dashboard;
pub mod goals;
pub mod reports;
pub mod trend;

pub use budget::{budget_health, evaluate_budgets, overall_status};
pub use dashboard::Dashboard;
pub use goals::{goal_progress, savings_progress};
pub use trend::predict;
