//! Pluggable LLM backend abstraction
//!
//! This module provides a backend-agnostic interface for the two AI
//! operations the app needs: single-shot financial-plan generation and
//! the conversational assistant.
//!
//! # Architecture
//!
//! - `PlannerBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai_compatible, mock). Default: openai_compatible
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4.1-nano)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod openai_compatible;
pub mod parsing;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::NewFinancialPlan;

/// Inputs for plan generation
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub goal: String,
    pub monthly_income: f64,
    pub currency: String,
    /// Extra user-supplied refinements (living situation, fixed costs, ...)
    pub additional_context: Option<String>,
}

/// One turn of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// A plan produced by the model, parsed from its JSON response
///
/// Field-for-field the same shape the store persists, so handlers can
/// save it directly.
pub type GeneratedPlan = NewFinancialPlan;

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait PlannerBackend: Send + Sync {
    /// Generate a financial plan from the user's goal and income
    async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan>;

    /// Answer one chat turn given the system prompt and prior history
    async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client wrapper
///
/// Provides compile-time dispatch over the available backends while
/// remaining cheaply cloneable for shared server state.
#[derive(Clone)]
pub enum AIClient {
    OpenAICompatible(OpenAICompatibleBackend),
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from environment variables
    ///
    /// Returns None when no backend is configured; AI features are then
    /// disabled rather than failing at startup.
    pub fn from_env() -> Option<Self> {
        match std::env::var("AI_BACKEND").as_deref() {
            Ok("mock") => Some(Self::Mock(MockBackend::new())),
            Ok("openai_compatible") | Err(_) => {
                OpenAICompatibleBackend::from_env().map(Self::OpenAICompatible)
            }
            Ok(other) => {
                tracing::warn!("Unknown AI_BACKEND '{}', AI features disabled", other);
                None
            }
        }
    }

    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan> {
        match self {
            Self::OpenAICompatible(b) => b.generate_plan(request).await,
            Self::Mock(b) => b.generate_plan(request).await,
        }
    }

    pub async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        match self {
            Self::OpenAICompatible(b) => b.chat(system, history, message).await,
            Self::Mock(b) => b.chat(system, history, message).await,
        }
    }

    pub async fn health_check(&self) -> bool {
        match self {
            Self::OpenAICompatible(b) => b.health_check().await,
            Self::Mock(b) => b.health_check().await,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::OpenAICompatible(b) => b.model(),
            Self::Mock(b) => b.model(),
        }
    }

    pub fn host(&self) -> &str {
        match self {
            Self::OpenAICompatible(b) => b.host(),
            Self::Mock(b) => b.host(),
        }
    }
}
