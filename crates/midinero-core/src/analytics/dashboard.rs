//! Request-scoped dashboard queries
//!
//! A [`Dashboard`] binds the database, the user and "today" explicitly so
//! every report is computed for exactly one user over a bounded window.

use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use super::{budget, goals, reports, trend};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    BudgetHealthReport, CategoryAggregate, CategoryBreakdownItem, CategoryType, DashboardSummary,
    FinancialGoal, GoalProgress, MonthlyAggregate, MonthlyTrend, Overview, Prediction,
    ReportPeriod, SpendingPatterns, YearMonth,
};

pub const TREND_MONTHS: RangeInclusive<u32> = 1..=36;
pub const PATTERN_DAYS: RangeInclusive<u32> = 7..=365;
pub const PREDICTION_MONTHS: RangeInclusive<u32> = 3..=12;

pub const DEFAULT_TREND_MONTHS: u32 = 12;
pub const DEFAULT_PATTERN_DAYS: u32 = 90;
pub const DEFAULT_PREDICTION_MONTHS: u32 = 6;

/// Months shown by the summary's trend section
const SUMMARY_TREND_MONTHS: u32 = 6;

fn check_range(name: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Dashboard for one user as of one day
pub struct Dashboard<'a> {
    db: &'a Database,
    user_id: i64,
    today: NaiveDate,
}

impl<'a> Dashboard<'a> {
    pub fn new(db: &'a Database, user_id: i64, today: NaiveDate) -> Self {
        Self { db, user_id, today }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// First day of the window covering the last `months` calendar months,
    /// the current one included
    fn window_start(&self, months: u32) -> NaiveDate {
        YearMonth::from_date(self.today)
            .add_months(-(months as i32 - 1))
            .first_day()
    }

    /// Income/expense summary, optionally bounded by dates
    pub fn overview(&self, period: ReportPeriod) -> Result<Overview> {
        validate_period(&period)?;
        let totals = self
            .db
            .overview_totals(self.user_id, period.start_date, period.end_date)?;
        Ok(reports::overview(totals, period))
    }

    /// Month-by-month totals for the last `months` months
    pub fn trends(&self, months: u32) -> Result<Vec<MonthlyTrend>> {
        check_range("months", months, &TREND_MONTHS)?;
        let history = self
            .db
            .monthly_aggregates(self.user_id, self.window_start(months), self.today)?;
        Ok(reports::monthly_trends(&history))
    }

    /// Category totals with shares, optionally for one type and period
    pub fn categories(
        &self,
        category_type: Option<CategoryType>,
        period: ReportPeriod,
    ) -> Result<Vec<CategoryBreakdownItem>> {
        validate_period(&period)?;
        let aggregates = self.db.category_aggregates(
            self.user_id,
            category_type,
            period.start_date,
            period.end_date,
        )?;
        Ok(reports::category_breakdown(&aggregates))
    }

    /// Weekday spending patterns over the last `days` days
    pub fn patterns(&self, days: u32) -> Result<SpendingPatterns> {
        check_range("days", days, &PATTERN_DAYS)?;
        let from = self.today - Duration::days(i64::from(days));

        let expenses = self.db.expense_days(self.user_id, from, self.today)?;
        let frequent = self
            .db
            .most_frequent_expense_category(self.user_id, from, self.today)?;
        Ok(reports::spending_patterns(&expenses, frequent, days))
    }

    /// Next-month expense prediction from the last `months` months.
    ///
    /// Fails with [`Error::NoData`] when the window holds no transactions.
    pub fn prediction(&self, months: u32) -> Result<Prediction> {
        check_range("months", months, &PREDICTION_MONTHS)?;
        let (history, categories) = self.history_window(months)?;

        debug!(
            user_id = self.user_id,
            requested = months,
            available = history.len(),
            "Predicting next month's expenses"
        );
        trend::predict(&history, &categories)
    }

    /// Budget health for a month (defaults to the current month)
    pub fn budget_health(&self, month: Option<YearMonth>) -> Result<BudgetHealthReport> {
        let month = month.unwrap_or_else(|| YearMonth::from_date(self.today));
        let budgets = self.db.list_budget_spend(self.user_id, month)?;
        Ok(budget::budget_health(month, &budgets))
    }

    /// Every dashboard section in one result
    ///
    /// A user without history gets an empty prediction rather than an error.
    pub fn summary(&self) -> Result<DashboardSummary> {
        let prediction = match self.prediction(DEFAULT_PREDICTION_MONTHS) {
            Ok(prediction) => prediction,
            Err(Error::NoData) => Prediction::empty(),
            Err(e) => return Err(e),
        };

        Ok(DashboardSummary {
            overview: self.overview(ReportPeriod::default())?,
            trends: self.trends(SUMMARY_TREND_MONTHS)?,
            categories: self.categories(Some(CategoryType::Expense), ReportPeriod::default())?,
            prediction,
            budget_health: self.budget_health(None)?,
        })
    }

    pub fn goals(&self) -> Result<Vec<FinancialGoal>> {
        self.db.list_goals(self.user_id)
    }

    /// A goal measured against its month's income minus expenses
    pub fn goal_progress(&self, goal_id: i64) -> Result<GoalProgress> {
        let goal = self
            .db
            .get_goal(self.user_id, goal_id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))?;
        let totals = self.db.overview_totals(
            self.user_id,
            Some(goal.month.first_day()),
            Some(goal.month.last_day()),
        )?;

        debug!(goal_id, month = %goal.month, "Computed goal progress");
        Ok(goals::savings_progress(&goal, &totals))
    }

    /// Monthly aggregates with their category breakdowns, index-aligned
    fn history_window(
        &self,
        months: u32,
    ) -> Result<(Vec<MonthlyAggregate>, Vec<Vec<CategoryAggregate>>)> {
        let from = self.window_start(months);
        let history = self.db.monthly_aggregates(self.user_id, from, self.today)?;
        let mut by_month = self
            .db
            .category_monthly_history(self.user_id, from, self.today)?;

        let categories = history
            .iter()
            .map(|m| by_month.remove(&m.month).unwrap_or_default())
            .collect();
        Ok((history, categories))
    }
}

fn validate_period(period: &ReportPeriod) -> Result<()> {
    match (period.start_date, period.end_date) {
        (Some(start), Some(end)) if start > end => Err(Error::InvalidData(
            "start_date must be before or equal to end_date".to_string(),
        )),
        _ => Ok(()),
    }
}
