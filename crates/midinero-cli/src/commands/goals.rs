//! Savings goal command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use midinero_core::db::Database;
use midinero_core::models::YearMonth;
use midinero_core::money::parse_amount;
use midinero_core::Dashboard;

use super::budgets::parse_month;
use super::{resolve_user, truncate};

pub fn cmd_goal_set(
    db: &Database,
    username: &str,
    name: &str,
    month: Option<&str>,
    target: &str,
    today: NaiveDate,
) -> Result<()> {
    let user_id = resolve_user(db, username)?;
    let month = match month {
        Some(m) => parse_month(m)?,
        None => YearMonth::from_date(today),
    };
    let target = parse_amount(target).with_context(|| format!("Invalid target: {}", target))?;

    let goal_id = db
        .set_goal(user_id, name, month, target)
        .with_context(|| format!("Failed to set goal '{}'", name))?;
    db.log_audit(
        user_id,
        "goal_set",
        Some("goals"),
        Some(&format!("goal={}, month={}, target={}", goal_id, month, target)),
    )?;

    println!(
        "✅ Goal #{} '{}' for {}: {:.2}",
        goal_id,
        name.trim(),
        month.name(),
        target
    );
    Ok(())
}

pub fn cmd_goal_add(db: &Database, username: &str, goal_id: i64, amount: &str) -> Result<()> {
    let user_id = resolve_user(db, username)?;
    let amount = parse_amount(amount).with_context(|| format!("Invalid amount: {}", amount))?;

    let goal = db.add_goal_amount(user_id, goal_id, amount)?;
    db.log_audit(
        user_id,
        "goal_add_amount",
        Some("goals"),
        Some(&format!("goal={}, amount={}", goal_id, amount)),
    )?;

    println!(
        "✅ {}: {:.2} of {:.2} ({:.1}%)",
        goal.name, goal.current_amount, goal.target_amount, goal.progress
    );
    if goal.achieved {
        println!("   🎉 Goal achieved!");
    }
    Ok(())
}

pub fn cmd_goal_list(db: &Database, username: &str, today: NaiveDate) -> Result<()> {
    let user_id = resolve_user(db, username)?;
    let dashboard = Dashboard::new(db, user_id, today);
    let goals = dashboard.goals()?;

    println!();
    println!("🎯 Savings Goals");
    println!("   ─────────────────────────────────────────────────────────────");

    if goals.is_empty() {
        println!("   No goals yet.");
        println!("   Set one with: midinero goal set --user {} --name <name> --target <amount>", username);
        return Ok(());
    }

    println!(
        "   {:>4} │ {:20} │ {:7} │ {:>10} │ {:>10} │ {:>7} │ {:>10}",
        "ID", "Goal", "Month", "Target", "Saved", "Done", "Savings"
    );
    println!("   ─────┼──────────────────────┼─────────┼────────────┼────────────┼─────────┼───────────");
    for goal in &goals {
        let month_progress = dashboard.goal_progress(goal.id)?;
        let icon = if goal.achieved { "✅" } else { "  " };
        println!(
            "   {:>4} │ {:20} │ {:7} │ {:>10.2} │ {:>10.2} │ {:>6.1}% │ {:>10.2} {}",
            goal.id,
            truncate(&goal.name, 20),
            goal.month.to_string(),
            goal.target_amount,
            goal.current_amount,
            goal.progress,
            month_progress.current_savings,
            icon
        );
    }

    Ok(())
}
