//! Prompt construction for the LLM backend

/// Build the single-shot plan-generation prompt
///
/// The model is instructed to return only the JSON object that
/// `ai::parsing::parse_plan_response` understands, and to make the three
/// allocation amounts sum exactly to the monthly income.
pub fn plan_prompt(
    goal: &str,
    monthly_income: f64,
    currency: &str,
    additional_context: Option<&str>,
) -> String {
    let context_section = match additional_context {
        Some(ctx) if !ctx.trim().is_empty() => format!(
            "\n\nCRITICAL USER-SPECIFIC CONTEXT (MUST BE CONSIDERED):\n{}\n\n\
             This context may include multiple refinements and specific details about \
             their living situation, expenses, and circumstances. Carefully adjust ALL \
             aspects of the budget breakdown based on this information. Be realistic and \
             precise - if they mention specific costs or situations (like living with \
             parents, student loans, higher food costs, etc.), reflect that accurately \
             in the numbers and descriptions.",
            ctx.trim()
        ),
        _ => String::new(),
    };

    format!(
        r#"You are an experienced financial advisor creating a highly personalized financial plan.

USER INFORMATION:
Goal: {goal}
Monthly Income: {monthly_income}
Currency: {currency}{context_section}

INSTRUCTIONS:
1. If additional context is provided above, THIS MUST BE YOUR PRIMARY CONSIDERATION
2. Adjust the budget to reflect their specific circumstances accurately
3. The StructuredPlan should acknowledge and address the context they provided
4. Essential expenses should reflect their actual living situation
5. Be specific and actionable in your advice

Return ONLY a valid JSON object with this EXACT structure (no additional text):
{{
  "FinancialPlan": {{
    "Goal": "{goal}",
    "MonthlyIncome": {monthly_income},
    "Currency": "{currency}",
    "StructuredPlan": "A detailed but short, context-aware paragraph explaining how to achieve this goal.",
    "IncomeBreakdown": {{
      "EssentialExpenses": <number reflecting their actual situation>,
      "EssentialExpensesPurpose": "Specific description based on their context",
      "Savings": <number that's realistic for their goal and situation>,
      "SavingsPurpose": "How these savings specifically help achieve their stated goal",
      "DiscretionarySpending": <number>,
      "DiscretionarySpendingPurpose": "What this covers for their specific lifestyle"
    }}
  }}
}}

CRITICAL: All three amounts (EssentialExpenses, Savings, DiscretionarySpending) MUST add up to exactly {monthly_income}."#
    )
}

/// Build the chat assistant's system prompt, seeding it with the user's
/// serialized financial plan
pub fn chat_system_prompt(plan_json: &str) -> String {
    format!(
        r#"You are BudgetBuddy, a friendly and knowledgeable personal finance assistant. You help users:
- Track and manage their expenses
- Create and stick to budgets
- Understand their spending patterns
- Set and achieve financial goals
- Get personalized money-saving tips
- If the user asks to change their current financial plan, tell them to navigate to the Financial Goals section of the app and create a new plan there.
- You are strictly forbidden from answering any question that is not related to personal finance or budgeting. If the user asks anything outside of these topics, politely inform them that you can only assist with personal finance and budgeting-related queries.
- The financial plan for the user is as follows:
{plan_json}

Be concise, helpful, and encouraging. Use simple language and avoid jargon. When discussing numbers, be specific and practical. Always maintain a positive, supportive tone."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prompt_embeds_user_inputs() {
        let prompt = plan_prompt("Buy a car", 3500.0, "EUR", None);
        assert!(prompt.contains("Goal: Buy a car"));
        assert!(prompt.contains("Monthly Income: 3500"));
        assert!(prompt.contains("\"Currency\": \"EUR\""));
        assert!(!prompt.contains("CRITICAL USER-SPECIFIC CONTEXT"));
    }

    #[test]
    fn test_plan_prompt_includes_context_when_present() {
        let prompt = plan_prompt("Buy a car", 3500.0, "EUR", Some("I live with my parents"));
        assert!(prompt.contains("I live with my parents"));
        assert!(prompt.contains("CRITICAL USER-SPECIFIC CONTEXT"));
    }

    #[test]
    fn test_chat_system_prompt_embeds_plan() {
        let prompt = chat_system_prompt(r#"{"goal":"Buy a car"}"#);
        assert!(prompt.contains(r#"{"goal":"Buy a car"}"#));
        assert!(prompt.contains("personal finance"));
    }
}
