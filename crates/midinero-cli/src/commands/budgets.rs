//! Budget command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use midinero_core::db::Database;
use midinero_core::models::YearMonth;
use midinero_core::money::parse_amount;
use midinero_core::Dashboard;

use super::reports::print_budget_health;
use super::resolve_user;

/// Parse a `YYYY-MM` month argument
pub fn parse_month(s: &str) -> Result<YearMonth> {
    s.trim()
        .parse()
        .map_err(|e: String| anyhow::anyhow!("Invalid month '{}': {}", s, e))
}

pub fn cmd_budget_set(
    db: &Database,
    username: &str,
    category: &str,
    month: &str,
    limit: &str,
) -> Result<()> {
    let user_id = resolve_user(db, username)?;
    let month = parse_month(month)?;
    let limit = parse_amount(limit).with_context(|| format!("Invalid limit: {}", limit))?;

    db.set_budget(user_id, category, month, limit)
        .with_context(|| format!("Failed to set budget for '{}'", category))?;
    db.log_audit(
        user_id,
        "budget_set",
        Some("budget"),
        Some(&format!("category={}, month={}, limit={}", category, month, limit)),
    )?;

    println!(
        "✅ Budget for {} in {}: {:.2}",
        category.trim(),
        month.name(),
        limit
    );
    Ok(())
}

pub fn cmd_budget_list(
    db: &Database,
    username: &str,
    month: Option<&str>,
    today: NaiveDate,
) -> Result<()> {
    let user_id = resolve_user(db, username)?;
    let month = month.map(parse_month).transpose()?;

    let report = Dashboard::new(db, user_id, today).budget_health(month)?;
    print_budget_health(&report);
    Ok(())
}
