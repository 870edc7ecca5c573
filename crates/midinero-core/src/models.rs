//! Domain models for MiDinero
//!
//! Stored records (users, categories, transactions, budgets, goals) plus the
//! transient aggregates and report shapes computed per request.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Stored records
// ============================================================================

/// Whether a category tracks money coming in or going out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!(
                "Unknown category type: {} (valid: income, expense)",
                s
            )),
        }
    }
}

/// A user owning categories, transactions and budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user-defined income or expense category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub category_type: CategoryType,
    pub created_at: DateTime<Utc>,
}

/// A transaction ready to be inserted (from import or fixtures)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub category: String,
    pub category_type: CategoryType,
    /// Always positive; the category type carries the direction
    pub amount: Decimal,
    pub description: String,
    pub import_hash: String,
}

/// A configured monthly budget joined with what has been spent against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSpend {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
}

/// A named savings target for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: i64,
    pub name: String,
    pub month: YearMonth,
    pub target_amount: Decimal,
    /// Amount set aside so far
    pub current_amount: Decimal,
    /// Stays set once the target has been reached
    pub achieved: bool,
    /// `current_amount` as a percentage of the target, not capped
    pub progress: Decimal,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Calendar month
// ============================================================================

/// A calendar month (`YYYY-MM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && NaiveDate::from_ymd_opt(year, month, 1).is_some() {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.add_months(1)
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// Shift by a number of months (negative goes back in time)
    pub fn add_months(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Human readable name, e.g. "March 2025"
    pub fn name(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts `YYYY-MM` or a full `YYYY-MM-DD` date
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month: {} (use YYYY-MM)", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid month: {} (use YYYY-MM)", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month: {} (use YYYY-MM)", s))?;
        Self::new(year, month).ok_or_else(|| format!("Invalid month: {} (use YYYY-MM)", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Aggregates (read-only, derived from transactions)
// ============================================================================

/// Income/expense totals for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: YearMonth,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub transaction_count: i64,
}

/// Totals for one category over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category_id: i64,
    pub category_name: String,
    pub category_type: CategoryType,
    pub total: Decimal,
    pub transaction_count: i64,
    pub average: Decimal,
}

/// Raw totals behind the overview report
#[derive(Debug, Clone, Default)]
pub struct OverviewTotals {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub income_count: i64,
    pub expense_count: i64,
    pub max_expense: Option<Decimal>,
    pub min_expense: Option<Decimal>,
}

// ============================================================================
// Prediction
// ============================================================================

/// Direction of spending between the first and last month of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reliability of a prediction, driven by sample size only
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Predicted spend for a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub category_id: i64,
    pub category: String,
    pub predicted_amount: Decimal,
}

/// Next-month expense projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_total: Decimal,
    pub category_predictions: Vec<CategoryPrediction>,
    pub trend: Trend,
    pub trend_percentage: Decimal,
    pub confidence: Confidence,
    pub based_on_months: usize,
}

impl Prediction {
    /// Result reported when there is no history to extrapolate from
    pub fn empty() -> Self {
        Self {
            predicted_total: Decimal::ZERO,
            category_predictions: vec![],
            trend: Trend::Stable,
            trend_percentage: Decimal::ZERO,
            confidence: Confidence::Low,
            based_on_months: 0,
        }
    }
}

// ============================================================================
// Budget health
// ============================================================================

/// Spend-vs-limit status of a single budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Healthy,
    Warning,
    Exceeded,
}

impl BudgetHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
        }
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status across all budgets of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Warning,
    Exceeded,
    Critical,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<BudgetHealth> for OverallStatus {
    fn from(health: BudgetHealth) -> Self {
        match health {
            BudgetHealth::Healthy => Self::Healthy,
            BudgetHealth::Warning => Self::Warning,
            BudgetHealth::Exceeded => Self::Exceeded,
        }
    }
}

/// Evaluated budget for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    /// Negative once the budget is overspent
    pub remaining: Decimal,
    pub percentage: Decimal,
    pub status: BudgetHealth,
}

/// Budget health for a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetHealthReport {
    pub month: YearMonth,
    pub overall_status: OverallStatus,
    pub overall_percentage: Decimal,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub budgets: Vec<BudgetStatus>,
    pub has_budgets: bool,
}

// ============================================================================
// Goals
// ============================================================================

/// A goal measured against the actual savings of its month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: i64,
    pub name: String,
    pub month: YearMonth,
    pub target_amount: Decimal,
    pub achieved: bool,
    /// Income minus expenses of the goal's month
    pub current_savings: Decimal,
    /// Capped at 100; negative when the month is in deficit
    pub progress_percentage: Decimal,
}

// ============================================================================
// Dashboard reports
// ============================================================================

/// Optional date bounds echoed back in reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// General income/expense summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub savings_rate: Decimal,
    pub avg_income: Decimal,
    pub avg_expense: Decimal,
    pub transaction_count: i64,
    pub income_count: i64,
    pub expense_count: i64,
    pub max_expense: Decimal,
    pub min_expense: Decimal,
    pub period: ReportPeriod,
}

/// One month in the trends report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: YearMonth,
    pub month_name: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub transaction_count: i64,
}

/// One category in the breakdown report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdownItem {
    pub category_id: i64,
    pub category_name: String,
    pub category_type: CategoryType,
    pub total: Decimal,
    pub percentage: Decimal,
    pub transaction_count: i64,
    pub average: Decimal,
}

/// Spending on one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPattern {
    pub day: String,
    pub total: Decimal,
    pub count: i64,
    pub average: Decimal,
}

/// Weekday and category spending patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPatterns {
    pub daily_pattern: Vec<DayPattern>,
    pub most_frequent_category: Option<String>,
    pub most_frequent_count: i64,
    pub average_daily_spending: Decimal,
    pub analysis_period_days: u32,
}

/// Everything the dashboard page needs in one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub overview: Overview,
    pub trends: Vec<MonthlyTrend>,
    pub categories: Vec<CategoryBreakdownItem>,
    pub prediction: Prediction,
    pub budget_health: BudgetHealthReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_parse_and_display() {
        let ym: YearMonth = "2025-03".parse().unwrap();
        assert_eq!(ym.to_string(), "2025-03");
        assert_eq!(ym.name(), "March 2025");

        let from_date: YearMonth = "2025-03-17".parse().unwrap();
        assert_eq!(from_date, ym);

        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_arithmetic() {
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.add_months(-1), YearMonth::new(2024, 12).unwrap());
        assert_eq!(jan.add_months(13), YearMonth::new(2026, 2).unwrap());
        assert_eq!(
            YearMonth::new(2024, 2).unwrap().last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_category_type_from_str() {
        assert_eq!("Expense".parse::<CategoryType>(), Ok(CategoryType::Expense));
        assert_eq!("income".parse::<CategoryType>(), Ok(CategoryType::Income));
        assert!("transfer".parse::<CategoryType>().is_err());
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&Trend::Increasing).unwrap(),
            "\"increasing\""
        );
        assert_eq!(
            serde_json::to_string(&OverallStatus::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::to_string(&YearMonth::new(2025, 7).unwrap()).unwrap(),
            "\"2025-07\""
        );
    }
}
