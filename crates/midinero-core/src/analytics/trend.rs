//! Trend estimation and next-month expense prediction
//!
//! Works on an ordered window of monthly aggregates (oldest first):
//! - trend = relative change between the first and last month's expenses
//! - prediction = window average adjusted by that trend
//! - per-category predictions use the same adjustment on each category's
//!   average over the months it appears in

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    CategoryAggregate, CategoryPrediction, CategoryType, Confidence, MonthlyAggregate, Prediction,
    Trend,
};
use crate::money::{mean, percentage, round_money, round_pct};

/// Longest history window accepted by the estimator
pub const MAX_PERIODS: usize = 36;

/// Trend percentage above which spending counts as increasing (below the
/// negated value, decreasing)
const TREND_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Predict next month's expenses from a window of monthly history.
///
/// `category_history[i]` holds the category aggregates of `history[i]`; it may
/// be shorter than `history` (or empty) when no category breakdown is known.
pub fn predict(
    history: &[MonthlyAggregate],
    category_history: &[Vec<CategoryAggregate>],
) -> Result<Prediction> {
    if history.is_empty() {
        return Err(Error::NoData);
    }
    if history.len() > MAX_PERIODS {
        return Err(Error::InvalidData(format!(
            "History window of {} months exceeds the maximum of {}",
            history.len(),
            MAX_PERIODS
        )));
    }

    let expenses: Vec<Decimal> = history.iter().map(|m| m.total_expense).collect();
    let average = mean(&expenses).ok_or_else(out_of_range)?;

    let (trend, trend_percentage) = trend_between(expenses[0], expenses[expenses.len() - 1])?;
    let predicted_total = adjust(average, trend_percentage)?;

    let category_predictions = predict_categories(category_history, trend_percentage)?;
    let confidence = confidence_for(history.len());

    debug!(
        months = history.len(),
        %average,
        %trend_percentage,
        trend = trend.as_str(),
        "Computed expense prediction"
    );

    Ok(Prediction {
        predicted_total,
        category_predictions,
        trend,
        trend_percentage,
        confidence,
        based_on_months: history.len(),
    })
}

/// Classify the change from `first` to `last`, returning the rounded percentage.
/// A zero starting value yields `(Stable, 0)`.
pub fn trend_between(first: Decimal, last: Decimal) -> Result<(Trend, Decimal)> {
    if first.is_zero() {
        return Ok((Trend::Stable, Decimal::ZERO));
    }

    let change = last.checked_sub(first).ok_or_else(out_of_range)?;
    let pct = round_pct(percentage(change, first));
    Ok((classify(pct), pct))
}

/// Map a trend percentage onto a direction
pub fn classify(trend_percentage: Decimal) -> Trend {
    if trend_percentage > TREND_THRESHOLD {
        Trend::Increasing
    } else if trend_percentage < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Confidence label from the number of months in the window
pub fn confidence_for(periods: usize) -> Confidence {
    match periods {
        n if n >= 9 => Confidence::High,
        n if n >= 5 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

fn out_of_range() -> Error {
    Error::InvalidData("Predicted amount out of range".to_string())
}

/// `value * (1 + trend_percentage / 100)`, rounded to cents
fn adjust(value: Decimal, trend_percentage: Decimal) -> Result<Decimal> {
    trend_percentage
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|ratio| Decimal::ONE.checked_add(ratio))
        .and_then(|factor| value.checked_mul(factor))
        .map(round_money)
        .ok_or_else(out_of_range)
}

fn predict_categories(
    category_history: &[Vec<CategoryAggregate>],
    trend_percentage: Decimal,
) -> Result<Vec<CategoryPrediction>> {
    // category_id -> (name, monthly totals)
    let mut by_category: BTreeMap<i64, (String, Vec<Decimal>)> = BTreeMap::new();

    for month in category_history {
        for agg in month
            .iter()
            .filter(|a| a.category_type == CategoryType::Expense)
        {
            by_category
                .entry(agg.category_id)
                .or_insert_with(|| (agg.category_name.clone(), Vec::new()))
                .1
                .push(agg.total);
        }
    }

    let mut predictions = by_category
        .into_iter()
        .map(|(category_id, (category, totals))| {
            let avg = mean(&totals).ok_or_else(out_of_range)?;
            Ok(CategoryPrediction {
                category_id,
                category,
                predicted_amount: adjust(avg, trend_percentage)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    predictions.sort_by(|a, b| {
        b.predicted_amount
            .cmp(&a.predicted_amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(predictions)
}
