//! Expense CRUD handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{AppError, AppState, AuthUser, SuccessResponse};
use budgetbuddy_core::models::{ExpenseUpdate, ExpenseWithCategory, NewExpense};

/// GET /api/expenses - List the user's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ExpenseWithCategory>>, AppError> {
    let expenses = state.db.list_expenses(auth.user_id)?;

    state.db.log_audit(
        &auth.email,
        "list",
        Some("expense"),
        None,
        Some(&format!("count={}", expenses.len())),
    )?;

    Ok(Json(expenses))
}

/// POST /api/expenses - Record an expense
///
/// No budget has to exist for the chosen category; budgets are optional
/// per category.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewExpense>,
) -> Result<Json<ExpenseWithCategory>, AppError> {
    let expense = state.db.create_expense(auth.user_id, &req)?;

    state.db.log_audit(
        &auth.email,
        "create",
        Some("expense"),
        Some(expense.expense.id),
        Some(&format!("amount={}", expense.expense.amount)),
    )?;

    Ok(Json(expense))
}

/// GET /api/expenses/:id - Get one expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseWithCategory>, AppError> {
    let expense = state
        .db
        .get_expense(auth.user_id, id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    state
        .db
        .log_audit(&auth.email, "view", Some("expense"), Some(id), None)?;

    Ok(Json(expense))
}

/// PUT /api/expenses/:id - Partially update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseWithCategory>, AppError> {
    let expense = state.db.update_expense(auth.user_id, id, &req)?;

    state
        .db
        .log_audit(&auth.email, "update", Some("expense"), Some(id), None)?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_expense(auth.user_id, id)?;

    state
        .db
        .log_audit(&auth.email, "delete", Some("expense"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
