//! Financial plan operations
//!
//! One plan per user; saving a new plan overwrites the previous one.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{FinancialPlan, NewFinancialPlan};

fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<FinancialPlan> {
    let created_at: String = row.get(12)?;
    let updated_at: String = row.get(13)?;
    Ok(FinancialPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        goal: row.get(2)?,
        monthly_income: row.get(3)?,
        currency: row.get(4)?,
        structured_plan: row.get(5)?,
        essential_expenses: row.get(6)?,
        essential_purpose: row.get(7)?,
        savings: row.get(8)?,
        savings_purpose: row.get(9)?,
        discretionary_spending: row.get(10)?,
        discretionary_purpose: row.get(11)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

const PLAN_COLUMNS: &str = r#"
    id, user_id, goal, monthly_income, currency, structured_plan,
    essential_expenses, essential_purpose, savings, savings_purpose,
    discretionary_spending, discretionary_purpose, created_at, updated_at
"#;

impl Database {
    /// Create or replace a user's financial plan
    pub fn upsert_financial_plan(
        &self,
        user_id: i64,
        plan: &NewFinancialPlan,
    ) -> Result<FinancialPlan> {
        if plan.goal.trim().is_empty() {
            return Err(Error::InvalidInput("Goal is required".into()));
        }
        if !plan.monthly_income.is_finite() || plan.monthly_income < 0.0 {
            return Err(Error::InvalidInput(
                "Monthly income must be a non-negative number".into(),
            ));
        }
        for (label, amount) in [
            ("essential_expenses", plan.essential_expenses),
            ("savings", plan.savings),
            ("discretionary_spending", plan.discretionary_spending),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must be a non-negative number",
                    label
                )));
            }
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO financial_plans (
                user_id, goal, monthly_income, currency, structured_plan,
                essential_expenses, essential_purpose, savings, savings_purpose,
                discretionary_spending, discretionary_purpose
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                goal = excluded.goal,
                monthly_income = excluded.monthly_income,
                currency = excluded.currency,
                structured_plan = excluded.structured_plan,
                essential_expenses = excluded.essential_expenses,
                essential_purpose = excluded.essential_purpose,
                savings = excluded.savings,
                savings_purpose = excluded.savings_purpose,
                discretionary_spending = excluded.discretionary_spending,
                discretionary_purpose = excluded.discretionary_purpose,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                user_id,
                plan.goal.trim(),
                plan.monthly_income,
                plan.currency,
                plan.structured_plan,
                plan.essential_expenses,
                plan.essential_purpose,
                plan.savings,
                plan.savings_purpose,
                plan.discretionary_spending,
                plan.discretionary_purpose,
            ],
        )?;
        drop(conn);

        self.get_financial_plan(user_id)?
            .ok_or_else(|| Error::NotFound("Plan not found after save".into()))
    }

    /// Get a user's financial plan, if they have one
    pub fn get_financial_plan(&self, user_id: i64) -> Result<Option<FinancialPlan>> {
        let conn = self.conn()?;
        let plan = conn
            .query_row(
                &format!(
                    "SELECT {} FROM financial_plans WHERE user_id = ?",
                    PLAN_COLUMNS
                ),
                params![user_id],
                row_to_plan,
            )
            .optional()?;
        Ok(plan)
    }
}
