//! Budget operations

use rusqlite::params;
use rust_decimal::Decimal;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{BudgetSpend, CategoryType, YearMonth};
use crate::money::{from_cents, to_cents};

impl Database {
    /// Set (or replace) the monthly limit for an expense category
    pub fn set_budget(
        &self,
        user_id: i64,
        category: &str,
        month: YearMonth,
        limit: Decimal,
    ) -> Result<i64> {
        if limit.is_sign_negative() {
            return Err(Error::InvalidData(format!(
                "Budget limit cannot be negative: {}",
                limit
            )));
        }
        let limit_cents = to_cents(limit)?;
        let category_id = self.upsert_category(user_id, category, CategoryType::Expense)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (user_id, category_id, month, limit_cents)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, category_id, month) DO UPDATE SET limit_cents = excluded.limit_cents
            "#,
            params![
                user_id,
                category_id,
                month.first_day().to_string(),
                limit_cents
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM budgets WHERE user_id = ? AND category_id = ? AND month = ?",
            params![user_id, category_id, month.first_day().to_string()],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Budgets of a month joined with the expenses booked against them,
    /// ordered by category name
    pub fn list_budget_spend(&self, user_id: i64, month: YearMonth) -> Result<Vec<BudgetSpend>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                c.name,
                b.limit_cents,
                COALESCE((
                    SELECT SUM(t.amount_cents)
                    FROM transactions t
                    WHERE t.user_id = b.user_id
                      AND t.category_id = b.category_id
                      AND t.date BETWEEN ?2 AND ?3
                ), 0) AS spent_cents
            FROM budgets b
            JOIN categories c ON c.id = b.category_id
            WHERE b.user_id = ?1 AND b.month = ?2
            ORDER BY c.name
            "#,
        )?;

        let budgets = stmt
            .query_map(
                params![
                    user_id,
                    month.first_day().to_string(),
                    month.last_day().to_string()
                ],
                |row| {
                    Ok(BudgetSpend {
                        category: row.get(0)?,
                        limit: from_cents(row.get(1)?),
                        spent: from_cents(row.get(2)?),
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }
}
