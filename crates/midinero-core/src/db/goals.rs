//! Savings goal operations

use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{parse_date, parse_datetime, Database};
use crate::analytics::goals::goal_progress;
use crate::error::{Error, Result};
use crate::models::{FinancialGoal, YearMonth};
use crate::money::{from_cents, to_cents};

/// Columns: id, name, month, target_cents, current_cents, achieved, created_at
fn row_to_goal(row: &Row) -> rusqlite::Result<FinancialGoal> {
    let month: String = row.get(2)?;
    let target_amount = from_cents(row.get(3)?);
    let current_amount = from_cents(row.get(4)?);
    let created_at: String = row.get(6)?;
    Ok(FinancialGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        month: YearMonth::from_date(parse_date(&month)?),
        target_amount,
        current_amount,
        achieved: row.get(5)?,
        progress: goal_progress(current_amount, target_amount),
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Create a goal for a month, or change the target of an existing one
    ///
    /// Lowering the target below what has been set aside marks the goal
    /// achieved; raising it never clears the flag.
    pub fn set_goal(
        &self,
        user_id: i64,
        name: &str,
        month: YearMonth,
        target: Decimal,
    ) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Goal name cannot be empty".to_string()));
        }
        if target <= Decimal::ZERO {
            return Err(Error::InvalidData(format!(
                "Goal target must be positive: {}",
                target
            )));
        }
        let target_cents = to_cents(target)?;
        if target_cents == 0 {
            return Err(Error::InvalidData(format!(
                "Goal target must be at least one cent: {}",
                target
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO goals (user_id, name, month, target_cents)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, name, month) DO UPDATE SET
                target_cents = excluded.target_cents,
                achieved = (achieved OR current_cents >= excluded.target_cents)
            "#,
            params![user_id, name, month.first_day().to_string(), target_cents],
        )?;

        let id = conn.query_row(
            "SELECT id FROM goals WHERE user_id = ? AND name = ? AND month = ?",
            params![user_id, name, month.first_day().to_string()],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Add money to a goal, marking it achieved once the target is covered
    pub fn add_goal_amount(
        &self,
        user_id: i64,
        goal_id: i64,
        amount: Decimal,
    ) -> Result<FinancialGoal> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidData(format!(
                "Amount must be positive: {}",
                amount
            )));
        }

        let goal = self
            .get_goal(user_id, goal_id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))?;
        let current_cents = to_cents(goal.current_amount)?
            .checked_add(to_cents(amount)?)
            .ok_or_else(|| Error::InvalidData(format!("Amount out of range: {}", amount)))?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE goals
            SET current_cents = ?1,
                achieved = (achieved OR ?1 >= target_cents)
            WHERE id = ?2 AND user_id = ?3
            "#,
            params![current_cents, goal_id, user_id],
        )?;

        self.get_goal(user_id, goal_id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))
    }

    /// Get one of a user's goals
    pub fn get_goal(&self, user_id: i64, goal_id: i64) -> Result<Option<FinancialGoal>> {
        let conn = self.conn()?;
        let goal = conn
            .query_row(
                r#"
                SELECT id, name, month, target_cents, current_cents, achieved, created_at
                FROM goals
                WHERE id = ? AND user_id = ?
                "#,
                params![goal_id, user_id],
                row_to_goal,
            )
            .optional()?;
        Ok(goal)
    }

    /// All of a user's goals, newest month first, then by name
    pub fn list_goals(&self, user_id: i64) -> Result<Vec<FinancialGoal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, month, target_cents, current_cents, achieved, created_at
            FROM goals
            WHERE user_id = ?
            ORDER BY month DESC, name
            "#,
        )?;

        let goals = stmt
            .query_map(params![user_id], row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(goals)
    }
}
