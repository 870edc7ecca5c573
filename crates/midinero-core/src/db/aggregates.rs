//! Read-only aggregates over a user's transactions
//!
//! Everything is summed in integer cents by SQLite and converted to
//! [`Decimal`] on the way out. Optional date bounds are inclusive.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{parse_date, Database};
use crate::error::Result;
use crate::models::{CategoryAggregate, CategoryType, MonthlyAggregate, OverviewTotals, YearMonth};
use crate::money::{average, from_cents};

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

/// Parse a text column, surfacing bad values as a conversion failure
fn parse_text<T: FromStr<Err = String>>(s: &str) -> rusqlite::Result<T> {
    s.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })
}

fn parse_month(s: &str) -> rusqlite::Result<YearMonth> {
    parse_text(s)
}

fn parse_category_type(s: &str) -> rusqlite::Result<CategoryType> {
    parse_text(s)
}

/// Columns: id, name, type, total_cents, count
fn row_to_category_aggregate(row: &Row) -> rusqlite::Result<CategoryAggregate> {
    let type_str: String = row.get(2)?;
    let total = from_cents(row.get(3)?);
    let count: i64 = row.get(4)?;
    Ok(CategoryAggregate {
        category_id: row.get(0)?,
        category_name: row.get(1)?,
        category_type: parse_category_type(&type_str)?,
        total,
        transaction_count: count,
        average: average(total, count),
    })
}

impl Database {
    /// Income/expense totals per calendar month, oldest first
    ///
    /// Months without transactions are not returned.
    pub fn monthly_aggregates(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlyAggregate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                strftime('%Y-%m', t.date) AS month,
                COALESCE(SUM(CASE WHEN c.category_type = 'income' THEN t.amount_cents ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN c.category_type = 'expense' THEN t.amount_cents ELSE 0 END), 0),
                COUNT(*)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3
            GROUP BY month
            ORDER BY month
            "#,
        )?;

        let months = stmt
            .query_map(
                params![user_id, from.to_string(), to.to_string()],
                |row| {
                    let month: String = row.get(0)?;
                    Ok(MonthlyAggregate {
                        month: parse_month(&month)?,
                        total_income: from_cents(row.get(1)?),
                        total_expense: from_cents(row.get(2)?),
                        transaction_count: row.get(3)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(months)
    }

    /// Totals per category, optionally restricted to one type and a date range
    pub fn category_aggregates(
        &self,
        user_id: i64,
        category_type: Option<CategoryType>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CategoryAggregate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, c.category_type, SUM(t.amount_cents), COUNT(*)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1
              AND (?2 IS NULL OR c.category_type = ?2)
              AND (?3 IS NULL OR t.date >= ?3)
              AND (?4 IS NULL OR t.date <= ?4)
            GROUP BY c.id
            ORDER BY SUM(t.amount_cents) DESC, c.name
            "#,
        )?;

        let categories = stmt
            .query_map(
                params![
                    user_id,
                    category_type.map(|t| t.as_str()),
                    date_param(from),
                    date_param(to)
                ],
                row_to_category_aggregate,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Expense category totals for each month in the range
    ///
    /// Keys line up with the months returned by [`Database::monthly_aggregates`]
    /// for the same range.
    pub fn category_monthly_history(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<YearMonth, Vec<CategoryAggregate>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT strftime('%Y-%m', t.date) AS month,
                   c.id, c.name, c.category_type, SUM(t.amount_cents), COUNT(*)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1
              AND c.category_type = 'expense'
              AND t.date BETWEEN ?2 AND ?3
            GROUP BY month, c.id
            ORDER BY month, c.name
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![user_id, from.to_string(), to.to_string()],
                |row| {
                    let month: String = row.get(0)?;
                    let type_str: String = row.get(3)?;
                    let total = from_cents(row.get(4)?);
                    let count: i64 = row.get(5)?;
                    Ok((
                        parse_month(&month)?,
                        CategoryAggregate {
                            category_id: row.get(1)?,
                            category_name: row.get(2)?,
                            category_type: parse_category_type(&type_str)?,
                            total,
                            transaction_count: count,
                            average: average(total, count),
                        },
                    ))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut history: BTreeMap<YearMonth, Vec<CategoryAggregate>> = BTreeMap::new();
        for (month, aggregate) in rows {
            history.entry(month).or_default().push(aggregate);
        }
        Ok(history)
    }

    /// Raw totals behind the overview report
    pub fn overview_totals(
        &self,
        user_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<OverviewTotals> {
        let conn = self.conn()?;
        let totals = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN c.category_type = 'income' THEN t.amount_cents END), 0),
                COALESCE(SUM(CASE WHEN c.category_type = 'expense' THEN t.amount_cents END), 0),
                COUNT(CASE WHEN c.category_type = 'income' THEN 1 END),
                COUNT(CASE WHEN c.category_type = 'expense' THEN 1 END),
                MAX(CASE WHEN c.category_type = 'expense' THEN t.amount_cents END),
                MIN(CASE WHEN c.category_type = 'expense' THEN t.amount_cents END)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1
              AND (?2 IS NULL OR t.date >= ?2)
              AND (?3 IS NULL OR t.date <= ?3)
            "#,
            params![user_id, date_param(from), date_param(to)],
            |row| {
                let max: Option<i64> = row.get(4)?;
                let min: Option<i64> = row.get(5)?;
                Ok(OverviewTotals {
                    total_income: from_cents(row.get(0)?),
                    total_expense: from_cents(row.get(1)?),
                    income_count: row.get(2)?,
                    expense_count: row.get(3)?,
                    max_expense: max.map(from_cents),
                    min_expense: min.map(from_cents),
                })
            },
        )?;

        Ok(totals)
    }

    /// One `(date, amount)` entry per expense transaction in the range
    pub fn expense_days(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.date, t.amount_cents
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1
              AND c.category_type = 'expense'
              AND t.date BETWEEN ?2 AND ?3
            ORDER BY t.date, t.id
            "#,
        )?;

        let days = stmt
            .query_map(
                params![user_id, from.to_string(), to.to_string()],
                |row| {
                    let date: String = row.get(0)?;
                    Ok((parse_date(&date)?, from_cents(row.get(1)?)))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(days)
    }

    /// Expense category with the most transactions in the range
    ///
    /// Ties go to the alphabetically first category.
    pub fn most_frequent_expense_category(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<(String, i64)>> {
        let conn = self.conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT c.name, COUNT(*) AS n
                FROM transactions t
                JOIN categories c ON c.id = t.category_id
                WHERE t.user_id = ?1
                  AND c.category_type = 'expense'
                  AND t.date BETWEEN ?2 AND ?3
                GROUP BY c.id
                ORDER BY n DESC, c.name
                LIMIT 1
                "#,
                params![user_id, from.to_string(), to.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(result)
    }
}
