//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, AuthUser};
use budgetbuddy_core::models::AuditEntry;

/// Query parameters for listing the audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// GET /api/audit - Recent API access records
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthUser>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let entries = state.db.list_audit_log(limit)?;
    Ok(Json(entries))
}
