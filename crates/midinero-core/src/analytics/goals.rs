//! Savings goal progress
//!
//! A goal is tracked two ways: the amount set aside by hand, and the
//! month's actual savings (income minus expenses). A zero target always
//! reports 0%.

use rust_decimal::Decimal;

use crate::models::{FinancialGoal, GoalProgress, OverviewTotals};
use crate::money::{percentage, round_money};

/// `current / target * 100`, rounded but not capped
pub fn goal_progress(current: Decimal, target: Decimal) -> Decimal {
    percentage(current, target)
}

/// Progress of a month's savings towards the goal, capped at 100%
pub fn savings_progress(goal: &FinancialGoal, month_totals: &OverviewTotals) -> GoalProgress {
    let savings = month_totals.total_income - month_totals.total_expense;

    GoalProgress {
        goal_id: goal.id,
        name: goal.name.clone(),
        month: goal.month,
        target_amount: round_money(goal.target_amount),
        achieved: goal.achieved,
        current_savings: round_money(savings),
        progress_percentage: percentage(savings, goal.target_amount).min(Decimal::ONE_HUNDRED),
    }
}
