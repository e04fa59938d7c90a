//! Spending category operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Category;

/// Default categories seeded for every new user (name, chart color)
pub const DEFAULT_CATEGORIES: [(&str, &str); 9] = [
    ("Food & Dining", "#FF6384"),
    ("Transportation", "#36A2EB"),
    ("Shopping", "#FFCE56"),
    ("Entertainment", "#4BC0C0"),
    ("Bills & Utilities", "#9966FF"),
    ("Healthcare", "#FF9F40"),
    ("Education", "#C9CBCF"),
    ("Travel", "#7C4DFF"),
    ("Other", "#607D8B"),
];

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    let created_at: String = row.get(4)?;
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: parse_datetime(&created_at),
    })
}

const CATEGORY_COLUMNS: &str = "id, user_id, name, color, created_at";

impl Database {
    /// Seed the default category set for a new user
    ///
    /// Idempotent: re-seeding skips names the user already has.
    pub fn seed_default_categories(&self, user_id: i64) -> Result<()> {
        let conn = self.conn()?;
        for (name, color) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT OR IGNORE INTO categories (user_id, name, color) VALUES (?, ?, ?)",
                params![user_id, name, color],
            )?;
        }
        Ok(())
    }

    /// Create a category for a user
    pub fn create_category(&self, user_id: i64, name: &str, color: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Category name is required".into()));
        }
        if !color.starts_with('#') || color.len() != 7 {
            return Err(Error::InvalidInput(format!(
                "Invalid color '{}' (expected #RRGGBB)",
                color
            )));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE user_id = ? AND name = ?",
                params![user_id, name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::Conflict(format!(
                "Category '{}' already exists",
                name
            )));
        }

        conn.execute(
            "INSERT INTO categories (user_id, name, color) VALUES (?, ?, ?)",
            params![user_id, name, color],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
            params![id],
            row_to_category,
        )
        .map_err(Into::into)
    }

    /// List a user's categories in creation order
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ? ORDER BY id",
            CATEGORY_COLUMNS
        ))?;
        let categories = stmt
            .query_map(params![user_id], row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// Get a category, scoped to its owner
    pub fn get_category(&self, user_id: i64, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE id = ? AND user_id = ?",
                    CATEGORY_COLUMNS
                ),
                params![id, user_id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Delete a category; cascades to its expenses and budgets
    pub fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM categories WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }
}
