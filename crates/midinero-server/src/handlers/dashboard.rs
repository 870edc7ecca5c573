//! Dashboard handlers
//!
//! Every endpoint reads for the authenticated user only and records the
//! access in the audit log.

use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{success, ApiResponse, AppError, AppState, UserContext};
use midinero_core::analytics::dashboard::{PATTERN_DAYS, PREDICTION_MONTHS, TREND_MONTHS};
use midinero_core::models::{
    BudgetHealthReport, CategoryBreakdownItem, CategoryType, DashboardSummary, MonthlyTrend,
    Overview, Prediction, ReportPeriod, SpendingPatterns, YearMonth,
};
use midinero_core::{Dashboard, Error};

/// Query parameters accepted by the dashboard endpoints
///
/// Everything arrives as text so malformed values produce the uniform
/// error envelope instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub months: Option<String>,
    pub months_to_analyze: Option<String>,
    pub days: Option<String>,
    pub category_type: Option<String>,
    pub month: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bounded(
    field: &str,
    value: &Option<String>,
    default: u32,
    range: &RangeInclusive<u32>,
) -> Result<u32, AppError> {
    let Some(raw) = present(value) else {
        return Ok(default);
    };
    let parsed: u32 = raw
        .parse()
        .map_err(|_| AppError::invalid_field(field, "A valid integer is required"))?;
    if !range.contains(&parsed) {
        return Err(AppError::invalid_field(
            field,
            &format!("Must be between {} and {}", range.start(), range.end()),
        ));
    }
    Ok(parsed)
}

fn parse_date(field: &str, value: &Option<String>) -> Result<Option<NaiveDate>, AppError> {
    present(value)
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::invalid_field(field, "Invalid date format (use YYYY-MM-DD)"))
}

fn parse_period(params: &DashboardQuery) -> Result<ReportPeriod, AppError> {
    let period = ReportPeriod {
        start_date: parse_date("start_date", &params.start_date)?,
        end_date: parse_date("end_date", &params.end_date)?,
    };
    if let (Some(start), Some(end)) = (period.start_date, period.end_date) {
        if start > end {
            return Err(AppError::invalid_field(
                "end_date",
                "end_date must be on or after start_date",
            ));
        }
    }
    Ok(period)
}

fn dashboard<'a>(state: &'a AppState, user: &UserContext) -> Dashboard<'a> {
    Dashboard::new(&state.db, user.user_id, state.today())
}

/// GET /api/finances/dashboard/overview - income/expense summary
pub async fn dashboard_overview(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<Overview>>, AppError> {
    let period = parse_period(&params)?;
    let overview = dashboard(&state, &user).overview(period)?;

    state.db.log_audit(
        user.user_id,
        "dashboard_view",
        Some("overview"),
        Some(&format!(
            "start={:?}, end={:?}",
            period.start_date, period.end_date
        )),
    )?;

    Ok(success("Financial overview retrieved", overview))
}

/// GET /api/finances/dashboard/trends - month-by-month totals
pub async fn dashboard_trends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<Vec<MonthlyTrend>>>, AppError> {
    let months = parse_bounded(
        "months",
        &params.months,
        state.config.dashboard.trend_months,
        &TREND_MONTHS,
    )?;
    let trends = dashboard(&state, &user).trends(months)?;

    state.db.log_audit(
        user.user_id,
        "dashboard_view",
        Some("trends"),
        Some(&format!("months={}", months)),
    )?;

    Ok(success(
        format!("Trends for the last {} months retrieved", months),
        trends,
    ))
}

/// GET /api/finances/dashboard/categories - category breakdown
pub async fn dashboard_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryBreakdownItem>>>, AppError> {
    let category_type = present(&params.category_type)
        .map(|s| s.parse::<CategoryType>())
        .transpose()
        .map_err(|e| AppError::invalid_field("category_type", &e))?;
    let period = parse_period(&params)?;

    let categories = dashboard(&state, &user).categories(category_type, period)?;

    state.db.log_audit(
        user.user_id,
        "dashboard_view",
        Some("categories"),
        Some(&format!(
            "type={}, start={:?}, end={:?}",
            category_type.map(|t| t.as_str()).unwrap_or("all"),
            period.start_date,
            period.end_date
        )),
    )?;

    Ok(success("Category breakdown retrieved", categories))
}

/// GET /api/finances/dashboard/patterns - weekday spending patterns
pub async fn dashboard_patterns(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<SpendingPatterns>>, AppError> {
    let days = parse_bounded(
        "days",
        &params.days,
        state.config.dashboard.pattern_days,
        &PATTERN_DAYS,
    )?;
    let patterns = dashboard(&state, &user).patterns(days)?;

    state.db.log_audit(
        user.user_id,
        "dashboard_view",
        Some("patterns"),
        Some(&format!("days={}", days)),
    )?;

    Ok(success(
        format!("Spending patterns for the last {} days retrieved", days),
        patterns,
    ))
}

/// GET /api/finances/dashboard/prediction - next-month expense prediction
///
/// A user without history gets an empty prediction, not an error.
pub async fn dashboard_prediction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<Prediction>>, AppError> {
    let months = parse_bounded(
        "months_to_analyze",
        &params.months_to_analyze,
        state.config.dashboard.prediction_months,
        &PREDICTION_MONTHS,
    )?;

    let (message, prediction) = match dashboard(&state, &user).prediction(months) {
        Ok(prediction) => ("Expense prediction generated", prediction),
        Err(Error::NoData) => (
            "Not enough history to predict expenses",
            Prediction::empty(),
        ),
        Err(e) => return Err(e.into()),
    };

    state.db.log_audit(
        user.user_id,
        "dashboard_view",
        Some("prediction"),
        Some(&format!(
            "months={}, based_on={}",
            months, prediction.based_on_months
        )),
    )?;

    Ok(success(message, prediction))
}

/// GET /api/finances/dashboard/budget-health - budget status for a month
pub async fn dashboard_budget_health(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<BudgetHealthReport>>, AppError> {
    let month = present(&params.month)
        .map(|s| s.parse::<YearMonth>())
        .transpose()
        .map_err(|e| AppError::invalid_field("month", &e))?;

    let report = dashboard(&state, &user).budget_health(month)?;

    state.db.log_audit(
        user.user_id,
        "dashboard_view",
        Some("budget_health"),
        Some(&format!(
            "month={}, status={}",
            report.month, report.overall_status
        )),
    )?;

    Ok(success("Budget health evaluated", report))
}

/// GET /api/finances/dashboard/summary - every dashboard section at once
pub async fn dashboard_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let summary = dashboard(&state, &user).summary()?;

    state
        .db
        .log_audit(user.user_id, "dashboard_view", Some("summary"), None)?;

    Ok(success("Dashboard summary retrieved", summary))
}
