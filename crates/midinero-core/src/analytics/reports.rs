//! Report shaping for the dashboard
//!
//! Pure functions that turn storage aggregates into the report structures
//! served by the API and printed by the CLI.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    CategoryAggregate, CategoryBreakdownItem, DayPattern, MonthlyAggregate, MonthlyTrend,
    Overview, OverviewTotals, ReportPeriod, SpendingPatterns,
};
use crate::money::{average, percentage, round_money};

/// General income/expense summary for a period
pub fn overview(totals: OverviewTotals, period: ReportPeriod) -> Overview {
    let balance = totals.total_income - totals.total_expense;

    Overview {
        total_income: round_money(totals.total_income),
        total_expense: round_money(totals.total_expense),
        balance: round_money(balance),
        savings_rate: percentage(balance, totals.total_income),
        avg_income: round_money(average(totals.total_income, totals.income_count)),
        avg_expense: round_money(average(totals.total_expense, totals.expense_count)),
        transaction_count: totals.income_count + totals.expense_count,
        income_count: totals.income_count,
        expense_count: totals.expense_count,
        max_expense: round_money(totals.max_expense.unwrap_or(Decimal::ZERO)),
        min_expense: round_money(totals.min_expense.unwrap_or(Decimal::ZERO)),
        period,
    }
}

/// Month-by-month income, expenses and balance (input order is kept)
pub fn monthly_trends(months: &[MonthlyAggregate]) -> Vec<MonthlyTrend> {
    months
        .iter()
        .map(|m| MonthlyTrend {
            month: m.month,
            month_name: m.month.name(),
            total_income: round_money(m.total_income),
            total_expense: round_money(m.total_expense),
            balance: round_money(m.total_income - m.total_expense),
            transaction_count: m.transaction_count,
        })
        .collect()
}

/// Category totals with their share of the grand total, largest first
pub fn category_breakdown(categories: &[CategoryAggregate]) -> Vec<CategoryBreakdownItem> {
    let grand_total: Decimal = categories.iter().map(|c| c.total).sum();

    let mut items: Vec<CategoryBreakdownItem> = categories
        .iter()
        .map(|c| CategoryBreakdownItem {
            category_id: c.category_id,
            category_name: c.category_name.clone(),
            category_type: c.category_type,
            total: round_money(c.total),
            percentage: percentage(c.total, grand_total),
            transaction_count: c.transaction_count,
            average: round_money(c.average),
        })
        .collect();

    items.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    items
}

/// Weekday spending patterns over the last `days` days.
///
/// `expenses` holds one `(date, amount)` entry per expense transaction and
/// `most_frequent` the category with the most expense transactions, if any.
pub fn spending_patterns(
    expenses: &[(NaiveDate, Decimal)],
    most_frequent: Option<(String, i64)>,
    days: u32,
) -> SpendingPatterns {
    // Monday first
    let mut by_day: BTreeMap<u32, (Decimal, i64)> = BTreeMap::new();
    for (date, amount) in expenses {
        let entry = by_day
            .entry(date.weekday().num_days_from_monday())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += *amount;
        entry.1 += 1;
    }

    let daily_pattern = by_day
        .into_iter()
        .map(|(day, (total, count))| DayPattern {
            day: weekday_name(day).to_string(),
            total: round_money(total),
            count,
            average: round_money(average(total, count)),
        })
        .collect();

    let total: Decimal = expenses.iter().map(|(_, amount)| *amount).sum();
    let (most_frequent_category, most_frequent_count) = match most_frequent {
        Some((name, count)) => (Some(name), count),
        None => (None, 0),
    };

    SpendingPatterns {
        daily_pattern,
        most_frequent_category,
        most_frequent_count,
        average_daily_spending: round_money(average(total, i64::from(days))),
        analysis_period_days: days,
    }
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn weekday_name(days_from_monday: u32) -> &'static str {
    WEEKDAYS[days_from_monday as usize % 7]
}
