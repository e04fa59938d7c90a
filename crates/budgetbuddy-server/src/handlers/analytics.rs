//! Dashboard analytics handlers
//!
//! Each endpoint fetches the user's snapshot and runs the pure
//! aggregation functions over it; nothing here mutates stored state.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{AppError, AppState, AuthUser};
use budgetbuddy_core::analytics;
use budgetbuddy_core::models::{
    AnalyticsSummary, CategoryData, ExpenseWithCategory, MonthlyData, RecurringFrequency,
};

/// GET /api/analytics/summary - Dashboard totals
pub async fn analytics_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let expenses = state.db.list_expenses(auth.user_id)?;
    let budgets = state.db.list_budgets(auth.user_id)?;
    let categories = state.db.list_categories(auth.user_id)?;

    let summary = analytics::summary(&expenses, &budgets, categories.len() as i64);

    state
        .db
        .log_audit(&auth.email, "report", Some("summary"), None, None)?;

    Ok(Json(summary))
}

/// GET /api/analytics/categories - Spending breakdown by category
pub async fn analytics_categories(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<CategoryData>>, AppError> {
    let expenses = state.db.list_expenses(auth.user_id)?;
    let breakdown = analytics::expenses_by_category(&expenses);

    state.db.log_audit(
        &auth.email,
        "report",
        Some("category_breakdown"),
        None,
        Some(&format!("categories={}", breakdown.len())),
    )?;

    Ok(Json(breakdown))
}

/// GET /api/analytics/monthly - Spending trend by month, ascending
pub async fn analytics_monthly(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<MonthlyData>>, AppError> {
    let expenses = state.db.list_expenses(auth.user_id)?;
    let monthly = analytics::monthly_expenses(&expenses);

    state.db.log_audit(
        &auth.email,
        "report",
        Some("monthly_trend"),
        None,
        Some(&format!("months={}", monthly.len())),
    )?;

    Ok(Json(monthly))
}

/// A recurring expense with its projected yearly cost
#[derive(Debug, Serialize)]
pub struct RecurringExpenseView {
    #[serde(flatten)]
    pub expense: ExpenseWithCategory,
    pub annual_cost: f64,
}

/// Recurring-expense report
#[derive(Debug, Serialize)]
pub struct RecurringReport {
    pub expenses: Vec<RecurringExpenseView>,
    /// Sum of monthly-frequency amounts (per month)
    pub total_monthly: f64,
    /// Sum of yearly-frequency amounts (per year)
    pub total_yearly: f64,
    /// Projected yearly cost across all recurring expenses
    pub total_annual_cost: f64,
}

/// GET /api/analytics/recurring - Recurring expenses with annualized costs
pub async fn analytics_recurring(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<RecurringReport>, AppError> {
    let expenses = state.db.list_expenses(auth.user_id)?;
    let recurring = analytics::recurring_expenses(&expenses);

    let total_monthly: f64 = recurring
        .iter()
        .filter(|e| e.expense.recurring_frequency == Some(RecurringFrequency::Monthly))
        .map(|e| e.expense.amount)
        .sum();
    let total_yearly: f64 = recurring
        .iter()
        .filter(|e| e.expense.recurring_frequency == Some(RecurringFrequency::Yearly))
        .map(|e| e.expense.amount)
        .sum();

    let views: Vec<RecurringExpenseView> = recurring
        .into_iter()
        .map(|e| {
            let annual_cost =
                analytics::annualized_cost(e.expense.amount, e.expense.recurring_frequency);
            RecurringExpenseView {
                expense: e,
                annual_cost,
            }
        })
        .collect();

    let total_annual_cost: f64 = views.iter().map(|v| v.annual_cost).sum();

    state.db.log_audit(
        &auth.email,
        "report",
        Some("recurring"),
        None,
        Some(&format!("count={}", views.len())),
    )?;

    Ok(Json(RecurringReport {
        expenses: views,
        total_monthly,
        total_yearly,
        total_annual_cost,
    }))
}
