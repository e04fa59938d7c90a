//! Category management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, AuthUser, SuccessResponse};
use budgetbuddy_core::models::Category;

/// GET /api/categories - List the user's categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.db.list_categories(auth.user_id)?;

    state.db.log_audit(
        &auth.email,
        "list",
        Some("category"),
        None,
        Some(&format!("count={}", categories.len())),
    )?;

    Ok(Json(categories))
}

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub color: String,
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .db
        .create_category(auth.user_id, &req.name, &req.color)?;

    state.db.log_audit(
        &auth.email,
        "create",
        Some("category"),
        Some(category.id),
        Some(&format!("name={}", category.name)),
    )?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete a category (cascades to its
/// expenses and budgets)
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_category(auth.user_id, id)?;

    state
        .db
        .log_audit(&auth.email, "delete", Some("category"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
