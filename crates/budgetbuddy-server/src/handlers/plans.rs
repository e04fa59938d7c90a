//! Financial plan handlers: get/save, LLM generation, allocation view

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, AuthUser};
use budgetbuddy_core::ai::PlanRequest;
use budgetbuddy_core::models::{FinancialPlan, NewFinancialPlan};
use budgetbuddy_core::plan::{actual_savings, PlanAllocation};
use budgetbuddy_core::{analytics, GeneratedPlan};

/// Response for GET /api/plan
///
/// An absent plan is a normal state (the user has not onboarded yet),
/// reported as `has_plan: false` rather than a 404.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub success: bool,
    pub has_plan: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<FinancialPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/plan - The user's financial plan, if any
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PlanResponse>, AppError> {
    let plan = state.db.get_financial_plan(auth.user_id)?;

    state
        .db
        .log_audit(&auth.email, "view", Some("plan"), None, None)?;

    Ok(Json(match plan {
        Some(plan) => PlanResponse {
            success: true,
            has_plan: true,
            plan: Some(plan),
            message: None,
        },
        None => PlanResponse {
            success: true,
            has_plan: false,
            plan: None,
            message: Some("No financial plan found for this user".into()),
        },
    }))
}

/// POST /api/plan - Save (create or replace) the user's plan
pub async fn save_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewFinancialPlan>,
) -> Result<Json<PlanResponse>, AppError> {
    let plan = state.db.upsert_financial_plan(auth.user_id, &req)?;

    state.db.log_audit(
        &auth.email,
        "save",
        Some("plan"),
        Some(plan.id),
        Some(&format!("goal={}", plan.goal)),
    )?;

    Ok(Json(PlanResponse {
        success: true,
        has_plan: true,
        plan: Some(plan),
        message: None,
    }))
}

/// Request body for plan generation
#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    pub goal: String,
    pub monthly_income: f64,
    pub currency: String,
    pub additional_context: Option<String>,
}

/// Response carrying the generated (not yet saved) plan
#[derive(Debug, Serialize)]
pub struct GeneratePlanResponse {
    pub success: bool,
    pub plan: GeneratedPlan,
}

/// POST /api/plan/generate - Ask the LLM for a plan
///
/// The result is returned for review; the client saves it via
/// POST /api/plan once the user accepts it.
pub async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<GeneratePlanRequest>,
) -> Result<Json<GeneratePlanResponse>, AppError> {
    if req.goal.trim().is_empty() || req.currency.trim().is_empty() {
        return Err(AppError::bad_request(
            "Goal, monthly income, and currency are required",
        ));
    }
    if !req.monthly_income.is_finite() || req.monthly_income <= 0.0 {
        return Err(AppError::bad_request(
            "Monthly income must be a positive number",
        ));
    }

    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;

    let generated = ai
        .generate_plan(&PlanRequest {
            goal: req.goal.clone(),
            monthly_income: req.monthly_income,
            currency: req.currency.clone(),
            additional_context: req.additional_context.clone(),
        })
        .await?;

    state.db.log_audit(
        &auth.email,
        "generate",
        Some("plan"),
        None,
        Some(&format!("goal={}", req.goal)),
    )?;

    Ok(Json(GeneratePlanResponse {
        success: true,
        plan: generated,
    }))
}

/// Response for GET /api/plan/allocation
#[derive(Debug, Serialize)]
pub struct PlanAllocationResponse {
    pub allocation: PlanAllocation,
    /// Income minus actual spend this snapshot - distinct from the
    /// plan's savings target
    pub actual_savings: f64,
}

/// GET /api/plan/allocation - Percentage view of the plan plus realized savings
pub async fn get_plan_allocation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PlanAllocationResponse>, AppError> {
    let plan = state
        .db
        .get_financial_plan(auth.user_id)?
        .ok_or_else(|| AppError::not_found("No financial plan found for this user"))?;

    let expenses = state.db.list_expenses(auth.user_id)?;
    let total = analytics::total_expenses(&expenses);

    state
        .db
        .log_audit(&auth.email, "view", Some("plan_allocation"), None, None)?;

    Ok(Json(PlanAllocationResponse {
        allocation: PlanAllocation::from_plan(&plan),
        actual_savings: actual_savings(plan.monthly_income, total),
    }))
}
