//! Expense operations
//!
//! Budgets never store a spent counter, so expense mutations need no
//! budget side effects; budget reads recompute from this table.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseUpdate, ExpenseWithCategory, NewExpense, RecurringFrequency};

fn row_to_expense_with_category(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<ExpenseWithCategory> {
    let date: String = row.get(5)?;
    let frequency: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(ExpenseWithCategory {
        expense: Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            amount: row.get(3)?,
            description: row.get(4)?,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            is_recurring: row.get::<_, i64>(6)? != 0,
            recurring_frequency: frequency
                .as_deref()
                .map(RecurringFrequency::from_str)
                .transpose()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        7,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        },
        category_name: row.get(10)?,
        category_color: row.get(11)?,
    })
}

const EXPENSE_SELECT: &str = r#"
    SELECT e.id, e.user_id, e.category_id, e.amount, e.description, e.date,
           e.is_recurring, e.recurring_frequency, e.created_at, e.updated_at,
           COALESCE(c.name, ''), c.color
    FROM expenses e
    LEFT JOIN categories c ON e.category_id = c.id
"#;

/// Reject amounts that are not strictly positive or not finite
fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidInput(
            "Expense amount must be a positive number".into(),
        ));
    }
    Ok(())
}

fn validate_recurrence(
    is_recurring: bool,
    frequency: Option<RecurringFrequency>,
) -> Result<()> {
    if !is_recurring && frequency.is_some() {
        return Err(Error::InvalidInput(
            "recurring_frequency requires is_recurring".into(),
        ));
    }
    Ok(())
}

impl Database {
    /// Create an expense
    ///
    /// No budget needs to exist for the expense's category; budgets are
    /// optional per category.
    pub fn create_expense(&self, user_id: i64, new: &NewExpense) -> Result<ExpenseWithCategory> {
        validate_amount(new.amount)?;
        validate_recurrence(new.is_recurring, new.recurring_frequency)?;
        if new.description.trim().is_empty() {
            return Err(Error::InvalidInput("Description is required".into()));
        }

        // The category must exist and belong to the caller
        if self.get_category(user_id, new.category_id)?.is_none() {
            return Err(Error::NotFound(format!(
                "Category {} not found",
                new.category_id
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, category_id, amount, description, date, is_recurring, recurring_frequency)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                new.category_id,
                new.amount,
                new.description.trim(),
                new.date.to_string(),
                new.is_recurring as i64,
                new.recurring_frequency.map(|f| f.as_str()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_expense(user_id, id)?
            .ok_or_else(|| Error::NotFound("Expense not found after creation".into()))
    }

    /// List a user's expenses, newest first
    pub fn list_expenses(&self, user_id: i64) -> Result<Vec<ExpenseWithCategory>> {
        let conn = self.conn()?;
        let sql = format!(
            "{} WHERE e.user_id = ? ORDER BY e.date DESC, e.id DESC",
            EXPENSE_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(params![user_id], row_to_expense_with_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(expenses)
    }

    /// Get an expense, scoped to its owner
    pub fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<ExpenseWithCategory>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE e.id = ? AND e.user_id = ?", EXPENSE_SELECT);
        let expense = conn
            .query_row(&sql, params![id, user_id], row_to_expense_with_category)
            .optional()?;
        Ok(expense)
    }

    /// Apply a partial update to an expense
    ///
    /// A missing id (or one owned by another user) is `NotFound`, never a
    /// silent no-op.
    pub fn update_expense(
        &self,
        user_id: i64,
        id: i64,
        update: &ExpenseUpdate,
    ) -> Result<ExpenseWithCategory> {
        let current = self
            .get_expense(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {} not found", id)))?
            .expense;

        let amount = update.amount.unwrap_or(current.amount);
        validate_amount(amount)?;

        let category_id = update.category_id.unwrap_or(current.category_id);
        if update.category_id.is_some() && self.get_category(user_id, category_id)?.is_none() {
            return Err(Error::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }

        let description = update
            .description
            .as_deref()
            .unwrap_or(current.description.as_str())
            .trim()
            .to_string();
        if description.is_empty() {
            return Err(Error::InvalidInput("Description is required".into()));
        }

        let date = update.date.unwrap_or(current.date);
        let is_recurring = update.is_recurring.unwrap_or(current.is_recurring);
        let recurring_frequency = match update.recurring_frequency {
            Some(freq) => freq,
            None => current.recurring_frequency,
        };
        validate_recurrence(is_recurring, recurring_frequency)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE expenses
            SET category_id = ?, amount = ?, description = ?, date = ?,
                is_recurring = ?, recurring_frequency = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
            params![
                category_id,
                amount,
                description,
                date.to_string(),
                is_recurring as i64,
                recurring_frequency.map(|f| f.as_str()),
                id,
                user_id,
            ],
        )?;
        drop(conn);

        self.get_expense(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {} not found", id)))
    }

    /// Delete an expense
    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Expense {} not found", id)));
        }
        Ok(())
    }

    /// Count a user's expenses
    pub fn count_expenses(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}
