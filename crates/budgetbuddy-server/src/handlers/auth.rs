//! Registration, login and current-user handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{issue_token, AppError, AppState, AuthUser};
use budgetbuddy_core::models::User;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub currency: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token + user payload returned by both auth endpoints
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register - Create an account
///
/// Seeds the default category set for the new user and signs them in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state.db.create_user(
        &req.email,
        &req.name,
        &req.password,
        req.currency.as_deref(),
    )?;

    state.db.log_audit(
        &user.email,
        "register",
        Some("user"),
        Some(user.id),
        None,
    )?;

    let token = issue_token(&user, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        success: true,
        token,
        user,
    }))
}

/// POST /api/auth/login - Exchange credentials for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state.db.verify_password(&req.email, &req.password)?;

    state
        .db
        .log_audit(&user.email, "login", Some("user"), Some(user.id), None)?;

    let token = issue_token(&user, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        success: true,
        token,
        user,
    }))
}

/// GET /api/me - The authenticated user's profile
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let user = state
        .db
        .get_user(auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}
