//! Chat assistant handler
//!
//! Conversational finance assistant seeded with the user's financial
//! plan. The plan must exist before the assistant can answer; the
//! system prompt embeds its serialized form.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, AuthUser};
use budgetbuddy_core::ai::ChatMessage;
use budgetbuddy_core::prompts;

/// Cap on how much history a single request may carry
const MAX_HISTORY_MESSAGES: usize = 20;

/// Request body for one chat turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

/// The assistant's reply
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}

/// POST /api/chat - Ask the assistant a question
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }

    let plan = state.db.get_financial_plan(auth.user_id)?.ok_or_else(|| {
        AppError::bad_request(
            "No financial plan found for user. Please create a financial plan first.",
        )
    })?;

    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;

    let plan_json = serde_json::to_string(&plan)
        .map_err(|_| AppError::internal("Failed to serialize plan"))?;
    let system = prompts::chat_system_prompt(&plan_json);

    // Keep only the most recent turns to bound prompt size
    let history = if req.conversation_history.len() > MAX_HISTORY_MESSAGES {
        &req.conversation_history[req.conversation_history.len() - MAX_HISTORY_MESSAGES..]
    } else {
        &req.conversation_history[..]
    };

    let reply = ai.chat(&system, history, &req.message).await?;

    state.db.log_audit(
        &auth.email,
        "chat",
        Some("assistant"),
        None,
        Some(&format!("history={}", history.len())),
    )?;

    Ok(Json(ChatResponse {
        reply,
        model: ai.model().to_string(),
    }))
}
