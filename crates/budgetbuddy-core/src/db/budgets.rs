//! Budget operations
//!
//! `spent` is recomputed from matching expenses on every read (a
//! correlated subquery over the budget's month) instead of maintaining a
//! stored counter. Two concurrent expense submissions therefore cannot
//! lose an increment: there is nothing to increment.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, validate_month, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetWithCategory};

fn row_to_budget_with_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<BudgetWithCategory> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(BudgetWithCategory {
        budget: Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            limit_amount: row.get(3)?,
            spent: row.get(4)?,
            month: row.get(5)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        },
        category_name: row.get(8)?,
        category_color: row.get(9)?,
    })
}

// The spent subquery keys on the first 7 chars of the expense date,
// which is the expense's "YYYY-MM" month for ISO-formatted dates.
const BUDGET_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.category_id, b.limit_amount,
           COALESCE((
               SELECT SUM(e.amount) FROM expenses e
               WHERE e.user_id = b.user_id
                 AND e.category_id = b.category_id
                 AND substr(e.date, 1, 7) = b.month
           ), 0) AS spent,
           b.month, b.created_at, b.updated_at,
           COALESCE(c.name, ''), c.color
    FROM budgets b
    LEFT JOIN categories c ON b.category_id = c.id
"#;

impl Database {
    /// Create a budget for one (category, month)
    ///
    /// At most one budget may exist per (user, category, month); a second
    /// create is a `Conflict`.
    pub fn create_budget(
        &self,
        user_id: i64,
        category_id: i64,
        limit_amount: f64,
        month: &str,
    ) -> Result<BudgetWithCategory> {
        if !limit_amount.is_finite() || limit_amount <= 0.0 {
            return Err(Error::InvalidInput(
                "Budget limit must be a positive number".into(),
            ));
        }
        validate_month(month)?;

        if self.get_category(user_id, category_id)?.is_none() {
            return Err(Error::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }

        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM budgets WHERE user_id = ? AND category_id = ? AND month = ?",
                params![user_id, category_id, month],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "Budget already exists for this category and month".into(),
            ));
        }

        conn.execute(
            "INSERT INTO budgets (user_id, category_id, limit_amount, month) VALUES (?, ?, ?, ?)",
            params![user_id, category_id, limit_amount, month],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_budget(user_id, id)?
            .ok_or_else(|| Error::NotFound("Budget not found after creation".into()))
    }

    /// List a user's budgets with computed spent totals
    pub fn list_budgets(&self, user_id: i64) -> Result<Vec<BudgetWithCategory>> {
        let conn = self.conn()?;
        let sql = format!(
            "{} WHERE b.user_id = ? ORDER BY b.month DESC, b.id",
            BUDGET_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let budgets = stmt
            .query_map(params![user_id], row_to_budget_with_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(budgets)
    }

    /// Get a budget with its computed spent total, scoped to its owner
    pub fn get_budget(&self, user_id: i64, id: i64) -> Result<Option<BudgetWithCategory>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE b.id = ? AND b.user_id = ?", BUDGET_SELECT);
        let budget = conn
            .query_row(&sql, params![id, user_id], row_to_budget_with_category)
            .optional()?;
        Ok(budget)
    }

    /// Update a budget's limit and/or month
    pub fn update_budget(
        &self,
        user_id: i64,
        id: i64,
        limit_amount: Option<f64>,
        month: Option<&str>,
    ) -> Result<BudgetWithCategory> {
        let current = self
            .get_budget(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Budget {} not found", id)))?
            .budget;

        let limit_amount = limit_amount.unwrap_or(current.limit_amount);
        if !limit_amount.is_finite() || limit_amount <= 0.0 {
            return Err(Error::InvalidInput(
                "Budget limit must be a positive number".into(),
            ));
        }

        let month = month.unwrap_or(&current.month);
        validate_month(month)?;

        let conn = self.conn()?;

        // Moving to a month that already has a budget for this category
        // would violate the uniqueness invariant
        let clash: Option<i64> = conn
            .query_row(
                "SELECT id FROM budgets WHERE user_id = ? AND category_id = ? AND month = ? AND id != ?",
                params![user_id, current.category_id, month, id],
                |row| row.get(0),
            )
            .optional()?;
        if clash.is_some() {
            return Err(Error::Conflict(
                "Budget already exists for this category and month".into(),
            ));
        }

        conn.execute(
            "UPDATE budgets SET limit_amount = ?, month = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
            params![limit_amount, month, id, user_id],
        )?;
        drop(conn);

        self.get_budget(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Budget {} not found", id)))
    }

    /// Delete a budget
    pub fn delete_budget(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM budgets WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Budget {} not found", id)));
        }
        Ok(())
    }

    /// Sum of a category's expense amounts, optionally restricted to one month
    ///
    /// This is the single source of truth for "spent"; budget reads embed
    /// the same aggregation.
    pub fn current_spent(
        &self,
        user_id: i64,
        category_id: i64,
        month: Option<&str>,
    ) -> Result<f64> {
        let conn = self.conn()?;
        let spent: f64 = match month {
            Some(m) => {
                validate_month(m)?;
                conn.query_row(
                    r#"
                    SELECT COALESCE(SUM(amount), 0) FROM expenses
                    WHERE user_id = ? AND category_id = ? AND substr(date, 1, 7) = ?
                    "#,
                    params![user_id, category_id, m],
                    |row| row.get(0),
                )?
            }
            None => conn.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE user_id = ? AND category_id = ?",
                params![user_id, category_id],
                |row| row.get(0),
            )?,
        };
        Ok(spent)
    }

    /// Count a user's budgets
    pub fn count_budgets(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM budgets WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}
