//! Report command implementations
//!
//! Each report prints a table by default, or the same payload the API
//! returns with `--json`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use midinero_core::db::Database;
use midinero_core::models::{
    BudgetHealth, BudgetHealthReport, CategoryType, OverallStatus, Prediction, ReportPeriod, Trend,
};
use midinero_core::{Dashboard, Error};
use serde::Serialize;

use super::budgets::parse_month;
use super::{resolve_user, truncate};

/// Build a report period from optional `--from`/`--to` arguments
pub fn resolve_period(from: Option<&str>, to: Option<&str>) -> Result<ReportPeriod> {
    let parse = |s: &str, flag: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
    };

    Ok(ReportPeriod {
        start_date: from.map(|s| parse(s, "from")).transpose()?,
        end_date: to.map(|s| parse(s, "to")).transpose()?,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn dashboard<'a>(db: &'a Database, username: &str, today: NaiveDate) -> Result<Dashboard<'a>> {
    Ok(Dashboard::new(db, resolve_user(db, username)?, today))
}

pub fn cmd_report_overview(
    db: &Database,
    username: &str,
    period: ReportPeriod,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let overview = dashboard(db, username, today)?.overview(period)?;
    if json {
        return print_json(&overview);
    }

    let describe = |d: Option<NaiveDate>| d.map_or("…".to_string(), |d| d.to_string());

    println!();
    println!("📊 Financial Overview");
    println!(
        "   Period: {} to {}",
        describe(period.start_date),
        describe(period.end_date)
    );
    println!("   ─────────────────────────────────────");

    if overview.transaction_count == 0 {
        println!("   No transactions found in this period.");
        return Ok(());
    }

    println!(
        "   Income:        {:>12.2}  ({} transactions)",
        overview.total_income, overview.income_count
    );
    println!(
        "   Expenses:      {:>12.2}  ({} transactions)",
        overview.total_expense, overview.expense_count
    );
    println!("   Balance:       {:>12.2}", overview.balance);
    println!("   Savings rate:  {:>11.2}%", overview.savings_rate);
    println!();
    println!("   Avg income:    {:>12.2}", overview.avg_income);
    println!("   Avg expense:   {:>12.2}", overview.avg_expense);
    println!(
        "   Expense range: {:.2} - {:.2}",
        overview.min_expense, overview.max_expense
    );

    Ok(())
}

pub fn cmd_report_trends(
    db: &Database,
    username: &str,
    months: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let trends = dashboard(db, username, today)?.trends(months)?;
    if json {
        return print_json(&trends);
    }

    println!();
    println!("📈 Monthly Trends (last {} months)", months);
    println!("   ─────────────────────────────────────────────────────────────");

    if trends.is_empty() {
        println!("   No transactions found in this period.");
        return Ok(());
    }

    println!(
        "   {:16} │ {:>12} │ {:>12} │ {:>12} │ {:>5}",
        "Month", "Income", "Expenses", "Balance", "Count"
    );
    println!("   ─────────────────┼──────────────┼──────────────┼──────────────┼──────");
    for t in &trends {
        println!(
            "   {:16} │ {:>12.2} │ {:>12.2} │ {:>12.2} │ {:>5}",
            t.month_name, t.total_income, t.total_expense, t.balance, t.transaction_count
        );
    }

    Ok(())
}

pub fn cmd_report_categories(
    db: &Database,
    username: &str,
    category_type: Option<CategoryType>,
    period: ReportPeriod,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let categories = dashboard(db, username, today)?.categories(category_type, period)?;
    if json {
        return print_json(&categories);
    }

    println!();
    match category_type {
        Some(t) => println!("🗂️  Categories ({})", t),
        None => println!("🗂️  Categories"),
    }
    println!("   ─────────────────────────────────────────────────────────────");

    if categories.is_empty() {
        println!("   No transactions found in this period.");
        return Ok(());
    }

    println!(
        "   {:20} │ {:7} │ {:>12} │ {:>6} │ {:>5} │ {:>10}",
        "Category", "Type", "Total", "%", "Count", "Average"
    );
    println!("   ─────────────────────┼─────────┼──────────────┼────────┼───────┼───────────");
    for c in &categories {
        println!(
            "   {:20} │ {:7} │ {:>12.2} │ {:>5.1}% │ {:>5} │ {:>10.2}",
            truncate(&c.category_name, 20),
            c.category_type.as_str(),
            c.total,
            c.percentage,
            c.transaction_count,
            c.average
        );
    }

    Ok(())
}

pub fn cmd_report_patterns(
    db: &Database,
    username: &str,
    days: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let patterns = dashboard(db, username, today)?.patterns(days)?;
    if json {
        return print_json(&patterns);
    }

    println!();
    println!("🗓️  Spending Patterns (last {} days)", days);
    println!("   ─────────────────────────────────────────────");

    if patterns.daily_pattern.is_empty() {
        println!("   No expenses found in this period.");
        return Ok(());
    }

    println!(
        "   {:10} │ {:>12} │ {:>5} │ {:>10}",
        "Day", "Total", "Count", "Average"
    );
    println!("   ───────────┼──────────────┼───────┼───────────");
    for day in &patterns.daily_pattern {
        println!(
            "   {:10} │ {:>12.2} │ {:>5} │ {:>10.2}",
            day.day, day.total, day.count, day.average
        );
    }

    println!();
    println!(
        "   Average daily spending: {:.2}",
        patterns.average_daily_spending
    );
    if let Some(category) = &patterns.most_frequent_category {
        println!(
            "   Most frequent category: {} ({} transactions)",
            category, patterns.most_frequent_count
        );
    }

    Ok(())
}

pub fn cmd_report_predict(
    db: &Database,
    username: &str,
    months: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let prediction = match dashboard(db, username, today)?.prediction(months) {
        Ok(prediction) => prediction,
        Err(Error::NoData) => {
            if json {
                return print_json(&Prediction::empty());
            }
            println!("   Not enough history to predict expenses.");
            println!("   Import some transactions first: midinero import --file statement.csv --user {}", username);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if json {
        return print_json(&prediction);
    }

    let trend_icon = match prediction.trend {
        Trend::Increasing => "📈",
        Trend::Decreasing => "📉",
        Trend::Stable => "➡️ ",
    };

    println!();
    println!("🔮 Next Month's Expenses");
    println!("   ─────────────────────────────────────");
    println!("   Predicted total: {:.2}", prediction.predicted_total);
    println!(
        "   Trend:           {} {} ({:+.2}%)",
        trend_icon, prediction.trend, prediction.trend_percentage
    );
    println!(
        "   Confidence:      {} (based on {} months)",
        prediction.confidence, prediction.based_on_months
    );

    if !prediction.category_predictions.is_empty() {
        println!();
        println!("   {:25} │ {:>12}", "Category", "Predicted");
        println!("   ──────────────────────────┼─────────────");
        for c in &prediction.category_predictions {
            println!(
                "   {:25} │ {:>12.2}",
                truncate(&c.category, 25),
                c.predicted_amount
            );
        }
    }

    Ok(())
}

pub fn cmd_report_budgets(
    db: &Database,
    username: &str,
    month: Option<&str>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let month = month.map(parse_month).transpose()?;
    let report = dashboard(db, username, today)?.budget_health(month)?;
    if json {
        return print_json(&report);
    }

    print_budget_health(&report);
    Ok(())
}

/// Print a budget health table
pub fn print_budget_health(report: &BudgetHealthReport) {
    println!();
    println!("💰 Budget Health - {}", report.month.name());
    println!("   ─────────────────────────────────────────────────────────────");

    if !report.has_budgets {
        println!("   No budgets set for this month.");
        println!("   Set one with: midinero budget set --user <name> --category <name> --month {} --limit <amount>", report.month);
        return;
    }

    println!(
        "   {:20} │ {:>10} │ {:>10} │ {:>10} │ {:>7} │ {}",
        "Category", "Limit", "Spent", "Remaining", "Used", "Status"
    );
    println!("   ─────────────────────┼────────────┼────────────┼────────────┼─────────┼──────────");
    for b in &report.budgets {
        let icon = match b.status {
            BudgetHealth::Healthy => "✅",
            BudgetHealth::Warning => "⚠️ ",
            BudgetHealth::Exceeded => "🚨",
        };
        println!(
            "   {:20} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>6.1}% │ {} {}",
            truncate(&b.category, 20),
            b.limit,
            b.spent,
            b.remaining,
            b.percentage,
            icon,
            b.status
        );
    }

    let overall_icon = match report.overall_status {
        OverallStatus::Healthy => "✅",
        OverallStatus::Warning => "⚠️ ",
        OverallStatus::Exceeded => "🚨",
        OverallStatus::Critical => "🔥",
    };

    println!();
    println!(
        "   Total: {:.2} of {:.2} ({:.1}%), remaining {:.2}",
        report.total_spent, report.total_budget, report.overall_percentage, report.total_remaining
    );
    println!(
        "   Overall: {} {}",
        overall_icon, report.overall_status
    );
}
