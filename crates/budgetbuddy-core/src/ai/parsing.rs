//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in markdown code fences or add
//! stray text around it; these helpers extract and validate the payload.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::NewFinancialPlan;

/// Wire shape of the model's plan response (PascalCase keys are part of
/// the prompt contract)
#[derive(Debug, Deserialize)]
struct PlanResponse {
    #[serde(rename = "FinancialPlan")]
    financial_plan: PlanBody,
}

#[derive(Debug, Deserialize)]
struct PlanBody {
    #[serde(rename = "Goal")]
    goal: String,
    #[serde(rename = "MonthlyIncome")]
    monthly_income: f64,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "StructuredPlan")]
    structured_plan: String,
    #[serde(rename = "IncomeBreakdown")]
    income_breakdown: IncomeBreakdown,
}

#[derive(Debug, Deserialize)]
struct IncomeBreakdown {
    #[serde(rename = "EssentialExpenses")]
    essential_expenses: f64,
    #[serde(rename = "EssentialExpensesPurpose")]
    essential_purpose: Option<String>,
    #[serde(rename = "Savings")]
    savings: f64,
    #[serde(rename = "SavingsPurpose")]
    savings_purpose: Option<String>,
    #[serde(rename = "DiscretionarySpending")]
    discretionary_spending: f64,
    #[serde(rename = "DiscretionarySpendingPurpose")]
    discretionary_purpose: Option<String>,
}

/// Parse a generated plan from an AI response
pub fn parse_plan_response(response: &str) -> Result<NewFinancialPlan> {
    let response = response.trim();

    // Look for the JSON object, skipping code fences or prose around it
    let start = response.find('{');
    let end = response.rfind('}');

    let parsed: PlanResponse = match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|err| {
                let truncated = if json_str.len() > 200 {
                    format!("{}...", &json_str[..200])
                } else {
                    json_str.to_string()
                };
                Error::InvalidInput(format!(
                    "Model returned malformed plan: {} | Raw: {}",
                    err, truncated
                ))
            })?
        }
        _ => {
            return Err(Error::InvalidInput(format!(
                "No JSON found in AI plan response | Raw: {}",
                if response.len() > 200 {
                    format!("{}...", &response[..200])
                } else {
                    response.to_string()
                }
            )))
        }
    };

    let body = parsed.financial_plan;
    Ok(NewFinancialPlan {
        goal: body.goal,
        monthly_income: body.monthly_income,
        currency: body.currency,
        structured_plan: body.structured_plan,
        essential_expenses: body.income_breakdown.essential_expenses,
        essential_purpose: body.income_breakdown.essential_purpose,
        savings: body.income_breakdown.savings,
        savings_purpose: body.income_breakdown.savings_purpose,
        discretionary_spending: body.income_breakdown.discretionary_spending,
        discretionary_purpose: body.income_breakdown.discretionary_purpose,
    })
}
