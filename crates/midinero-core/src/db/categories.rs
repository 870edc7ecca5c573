//! Category operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, CategoryType};

impl Database {
    /// Create a category or return the existing one's ID
    ///
    /// Categories are unique per user, name and type, so "Gifts" can exist
    /// both as income and as an expense.
    pub fn upsert_category(
        &self,
        user_id: i64,
        name: &str,
        category_type: CategoryType,
    ) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name cannot be empty".to_string()));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE user_id = ? AND name = ? AND category_type = ?",
                params![user_id, name, category_type.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO categories (user_id, name, category_type) VALUES (?, ?, ?)",
            params![user_id, name, category_type.as_str()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Find a category by name, preferring the expense category when both exist
    pub fn find_category(&self, user_id: i64, name: &str) -> Result<Option<Category>> {
        Ok(self
            .list_categories(user_id)?
            .into_iter()
            .filter(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .min_by_key(|c| c.category_type != CategoryType::Expense))
    }

    /// List a user's categories
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, name, category_type, created_at
            FROM categories
            WHERE user_id = ?
            ORDER BY category_type, name
            "#,
        )?;

        let categories = stmt
            .query_map(params![user_id], |row| {
                let type_str: String = row.get(3)?;
                let created_at: String = row.get(4)?;
                Ok(Category {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    category_type: type_str.parse().unwrap_or(CategoryType::Expense),
                    created_at: parse_datetime(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }
}
