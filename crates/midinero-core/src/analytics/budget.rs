//! Budget health evaluation
//!
//! Each budget is classified by how much of its limit has been spent:
//! below 80% is healthy, 80% up to and including 100% is a warning, and
//! anything over 100% is exceeded.

use rust_decimal::Decimal;

use crate::models::{
    BudgetHealth, BudgetHealthReport, BudgetSpend, BudgetStatus, OverallStatus, YearMonth,
};
use crate::money::{percentage, round_money};

const WARNING_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
const EXCEEDED_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Classify a spend percentage
pub fn classify(percentage: Decimal) -> BudgetHealth {
    if percentage > EXCEEDED_THRESHOLD {
        BudgetHealth::Exceeded
    } else if percentage >= WARNING_THRESHOLD {
        BudgetHealth::Warning
    } else {
        BudgetHealth::Healthy
    }
}

/// Evaluate every budget, preserving input order.
///
/// A zero limit reports 0% and healthy regardless of spend.
pub fn evaluate_budgets(budgets: &[BudgetSpend]) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|b| {
            let pct = percentage(b.spent, b.limit);
            BudgetStatus {
                category: b.category.clone(),
                limit: round_money(b.limit),
                spent: round_money(b.spent),
                remaining: round_money(b.limit - b.spent),
                percentage: pct,
                status: classify(pct),
            }
        })
        .collect()
}

/// Roll individual statuses up into one.
///
/// Critical when at least half of the budgets are exceeded, otherwise the
/// worst individual status. No budgets at all is healthy.
pub fn overall_status(statuses: &[BudgetStatus]) -> OverallStatus {
    if statuses.is_empty() {
        return OverallStatus::Healthy;
    }

    let exceeded = statuses
        .iter()
        .filter(|s| s.status == BudgetHealth::Exceeded)
        .count();
    if exceeded > 0 && exceeded * 2 >= statuses.len() {
        return OverallStatus::Critical;
    }

    statuses
        .iter()
        .map(|s| s.status)
        .max()
        .map(OverallStatus::from)
        .unwrap_or(OverallStatus::Healthy)
}

/// Full health report for a month
pub fn budget_health(month: YearMonth, budgets: &[BudgetSpend]) -> BudgetHealthReport {
    let statuses = evaluate_budgets(budgets);

    let total_budget: Decimal = budgets.iter().map(|b| b.limit).sum();
    let total_spent: Decimal = budgets.iter().map(|b| b.spent).sum();

    BudgetHealthReport {
        month,
        overall_status: overall_status(&statuses),
        overall_percentage: percentage(total_spent, total_budget),
        total_budget: round_money(total_budget),
        total_spent: round_money(total_spent),
        total_remaining: round_money(total_budget - total_spent),
        has_budgets: !statuses.is_empty(),
        budgets: statuses,
    }
}
