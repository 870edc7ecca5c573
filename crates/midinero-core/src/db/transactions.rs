//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::NewTransaction;
use crate::money::to_cents;

impl Database {
    /// Insert a transaction, creating its category if needed
    ///
    /// Returns `None` when a transaction with the same import hash already
    /// exists.
    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Option<i64>> {
        let amount_cents = to_cents(tx.amount)?;
        if amount_cents <= 0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be positive: {}",
                tx.amount
            )));
        }

        let category_id = self.upsert_category(user_id, &tx.category, tx.category_type)?;
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, category_id, amount_cents, date, description, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                category_id,
                amount_cents,
                tx.date.to_string(),
                tx.description,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Count a user's transactions
    pub fn count_transactions(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
