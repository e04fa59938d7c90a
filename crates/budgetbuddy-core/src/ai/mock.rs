//! Mock backend for testing
//!
//! Provides deterministic responses for both AI operations.
//! Useful for unit tests and development without a running LLM server.

use async_trait::async_trait;

use crate::error::Result;

use super::{ChatMessage, GeneratedPlan, PlanRequest, PlannerBackend};

/// Mock AI backend for testing
///
/// Generates a fixed 50/20/30 income split and canned chat replies.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl PlannerBackend for MockBackend {
    async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan> {
        let income = request.monthly_income;
        Ok(GeneratedPlan {
            goal: request.goal.clone(),
            monthly_income: income,
            currency: request.currency.clone(),
            structured_plan: format!(
                "To reach \"{}\", cover essentials first, set savings aside on payday, \
                 and keep discretionary spending within its share of your {} income.",
                request.goal, request.currency
            ),
            essential_expenses: income * 0.5,
            essential_purpose: Some("Rent, groceries, utilities and other fixed costs".into()),
            savings: income * 0.2,
            savings_purpose: Some(format!("Monthly progress toward: {}", request.goal)),
            discretionary_spending: income * 0.3,
            discretionary_purpose: Some("Dining out, entertainment and hobbies".into()),
        })
    }

    async fn chat(
        &self,
        _system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        Ok(format!(
            "Thanks for your question about \"{}\". Based on your financial plan, \
             keep tracking your expenses and stick to your budgets. ({} prior messages)",
            message,
            history.len()
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
