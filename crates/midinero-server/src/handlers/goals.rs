//! Savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::{success, ApiResponse, AppError, AppState, UserContext};
use midinero_core::models::{FinancialGoal, GoalProgress, YearMonth};
use midinero_core::money::parse_amount;
use midinero_core::Dashboard;

/// Body of POST /api/finances/goals
///
/// Amounts may arrive as JSON numbers or strings.
#[derive(Debug, Default, Deserialize)]
pub struct GoalRequest {
    pub name: Option<String>,
    pub month: Option<String>,
    pub target_amount: Option<Value>,
}

/// Body of POST /api/finances/goals/:goal_id/add-amount
#[derive(Debug, Default, Deserialize)]
pub struct AddAmountRequest {
    pub amount: Option<Value>,
}

fn parse_positive_amount(field: &str, value: &Option<Value>) -> Result<Decimal, AppError> {
    let raw = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(AppError::invalid_field(field, "This field is required")),
    };
    let amount = parse_amount(&raw)
        .map_err(|_| AppError::invalid_field(field, "A valid number is required"))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::invalid_field(field, "Must be greater than zero"));
    }
    Ok(amount)
}

fn parse_goal_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_field("goal_id", "A valid integer is required"))
}

/// GET /api/finances/goals - the user's goals, newest month first
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiResponse<Vec<FinancialGoal>>>, AppError> {
    let goals = state.db.list_goals(user.user_id)?;

    state
        .db
        .log_audit(user.user_id, "goal_view", Some("goals"), None)?;

    Ok(success(format!("{} goals retrieved", goals.len()), goals))
}

/// POST /api/finances/goals - create a goal or change its target
pub async fn set_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<GoalRequest>,
) -> Result<Json<ApiResponse<FinancialGoal>>, AppError> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::invalid_field("name", "This field is required"))?;
    let month: YearMonth = match body.month.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s
            .parse()
            .map_err(|_| AppError::invalid_field("month", "Invalid month (use YYYY-MM)"))?,
        _ => YearMonth::from_date(state.today()),
    };
    let target = parse_positive_amount("target_amount", &body.target_amount)?;

    let goal_id = state.db.set_goal(user.user_id, name, month, target)?;
    let goal = state
        .db
        .get_goal(user.user_id, goal_id)?
        .ok_or_else(|| AppError::not_found("Goal not found"))?;

    state.db.log_audit(
        user.user_id,
        "goal_set",
        Some("goals"),
        Some(&format!("goal={}, month={}, target={}", goal_id, month, target)),
    )?;

    Ok(success("Goal saved", goal))
}

/// POST /api/finances/goals/:goal_id/add-amount - set money aside
pub async fn add_goal_amount(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Path(goal_id): Path<String>,
    Json(body): Json<AddAmountRequest>,
) -> Result<Json<ApiResponse<FinancialGoal>>, AppError> {
    let goal_id = parse_goal_id(&goal_id)?;
    let amount = parse_positive_amount("amount", &body.amount)?;

    let goal = state.db.add_goal_amount(user.user_id, goal_id, amount)?;

    state.db.log_audit(
        user.user_id,
        "goal_add_amount",
        Some("goals"),
        Some(&format!("goal={}, amount={}", goal_id, amount)),
    )?;

    let message = if goal.achieved {
        "Amount added, goal achieved"
    } else {
        "Amount added"
    };
    Ok(success(message, goal))
}

/// GET /api/finances/goals/:goal_id/progress - goal against its month's savings
pub async fn goal_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Path(goal_id): Path<String>,
) -> Result<Json<ApiResponse<GoalProgress>>, AppError> {
    let goal_id = parse_goal_id(&goal_id)?;
    let progress = Dashboard::new(&state.db, user.user_id, state.today()).goal_progress(goal_id)?;

    state.db.log_audit(
        user.user_id,
        "goal_view",
        Some("goal_progress"),
        Some(&format!("goal={}", goal_id)),
    )?;

    Ok(success("Goal progress retrieved", progress))
}
