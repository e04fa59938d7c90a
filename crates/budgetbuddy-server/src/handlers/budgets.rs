//! Budget CRUD handlers
//!
//! Responses always carry a freshly recomputed `spent` alongside the
//! raw and clamped utilization percentages.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, AuthUser, SuccessResponse};
use budgetbuddy_core::analytics;
use budgetbuddy_core::models::{BudgetUtilization, BudgetWithCategory};

/// A budget response with its utilization attached
#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub budget: BudgetWithCategory,
    pub utilization: BudgetUtilization,
    pub over_budget: bool,
}

impl From<BudgetWithCategory> for BudgetResponse {
    fn from(budget: BudgetWithCategory) -> Self {
        let utilization = analytics::utilization(&budget);
        let over_budget = budget.budget.is_over_budget();
        Self {
            budget,
            utilization,
            over_budget,
        }
    }
}

/// GET /api/budgets - List the user's budgets with computed spent totals
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<BudgetResponse>>, AppError> {
    let budgets = state.db.list_budgets(auth.user_id)?;

    state.db.log_audit(
        &auth.email,
        "list",
        Some("budget"),
        None,
        Some(&format!("count={}", budgets.len())),
    )?;

    Ok(Json(budgets.into_iter().map(Into::into).collect()))
}

/// Request body for creating a budget
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    pub category_id: i64,
    /// Spending limit for the month
    pub limit_amount: f64,
    /// Covered period as "YYYY-MM"
    pub month: String,
}

/// POST /api/budgets - Create a budget for one (category, month)
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateBudgetRequest>,
) -> Result<Json<BudgetResponse>, AppError> {
    let budget =
        state
            .db
            .create_budget(auth.user_id, req.category_id, req.limit_amount, &req.month)?;

    state.db.log_audit(
        &auth.email,
        "create",
        Some("budget"),
        Some(budget.budget.id),
        Some(&format!(
            "category_id={}, month={}",
            req.category_id, req.month
        )),
    )?;

    Ok(Json(budget.into()))
}

/// GET /api/budgets/:id - Get one budget
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<BudgetResponse>, AppError> {
    let budget = state
        .db
        .get_budget(auth.user_id, id)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;

    state
        .db
        .log_audit(&auth.email, "view", Some("budget"), Some(id), None)?;

    Ok(Json(budget.into()))
}

/// Request body for updating a budget
#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    pub limit_amount: Option<f64>,
    pub month: Option<String>,
}

/// PUT /api/budgets/:id - Update a budget's limit and/or month
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBudgetRequest>,
) -> Result<Json<BudgetResponse>, AppError> {
    let budget = state.db.update_budget(
        auth.user_id,
        id,
        req.limit_amount,
        req.month.as_deref(),
    )?;

    state
        .db
        .log_audit(&auth.email, "update", Some("budget"), Some(id), None)?;

    Ok(Json(budget.into()))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_budget(auth.user_id, id)?;

    state
        .db
        .log_audit(&auth.email, "delete", Some("budget"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
