//! Domain models for BudgetBuddy

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Single-letter avatar derived from the name at registration
    pub avatar: Option<String>,
    /// Preferred display currency (ISO code, e.g. "USD")
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// A user-scoped spending category with a display color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Hex color for charts (e.g. "#FF6384")
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// How often a recurring expense repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Multiplier to project one charge to a full year
    pub fn annual_multiplier(&self) -> f64 {
        match self {
            Self::Daily => 365.0,
            Self::Weekly => 52.0,
            Self::Monthly => 12.0,
            Self::Yearly => 1.0,
        }
    }
}

impl std::str::FromStr for RecurringFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown recurring frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for RecurringFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dated transaction attributed to a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    /// Always strictly positive
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    pub is_recurring: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An expense joined with its category for API responses and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseWithCategory {
    #[serde(flatten)]
    pub expense: Expense,
    pub category_name: String,
    /// None if the category row is missing; analytics substitutes a
    /// fixed default color rather than failing
    pub category_color: Option<String>,
}

/// A new expense to be created
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub category_id: i64,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
}

/// Partial update for an expense (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    pub category_id: Option<i64>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub is_recurring: Option<bool>,
    /// Some(None) clears the frequency, Some(Some(_)) replaces it
    pub recurring_frequency: Option<Option<RecurringFrequency>>,
}

/// A spending ceiling for one (category, month) pair
///
/// `spent` is never stored: it is recomputed from matching expenses on
/// every read, so it cannot drift from the expense table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    /// The spending limit for the month
    pub limit_amount: f64,
    /// Sum of this category's expenses dated within `month`
    pub spent: f64,
    /// Covered period as "YYYY-MM"
    pub month: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Over budget means strictly past the limit; exactly at the limit
    /// is still within budget.
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.limit_amount
    }

    pub fn remaining(&self) -> f64 {
        self.limit_amount - self.spent
    }
}

/// A budget joined with its category for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetWithCategory {
    #[serde(flatten)]
    pub budget: Budget,
    pub category_name: String,
    pub category_color: Option<String>,
}

/// Budget usage split into a display-bar value and a raw value
///
/// The bar percent is clamped to 100 for rendering; the raw percent and
/// the remaining amount are not, so over-spend stays visible in text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetUtilization {
    /// Raw percent used, may exceed 100
    pub percent_used: f64,
    /// Clamped to at most 100 for progress bars
    pub percent_bar: f64,
    /// limit - spent, negative when over budget
    pub remaining: f64,
}

/// An AI-generated income-allocation recommendation, one per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialPlan {
    pub id: i64,
    pub user_id: i64,
    /// Free-text goal the user stated during onboarding
    pub goal: String,
    pub monthly_income: f64,
    pub currency: String,
    /// LLM-generated narrative explaining the plan
    pub structured_plan: String,
    pub essential_expenses: f64,
    pub essential_purpose: Option<String>,
    pub savings: f64,
    pub savings_purpose: Option<String>,
    pub discretionary_spending: f64,
    pub discretionary_purpose: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plan fields for creation/upsert (latest plan overwrites the previous)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFinancialPlan {
    pub goal: String,
    pub monthly_income: f64,
    pub currency: String,
    pub structured_plan: String,
    pub essential_expenses: f64,
    pub essential_purpose: Option<String>,
    pub savings: f64,
    pub savings_purpose: Option<String>,
    pub discretionary_spending: f64,
    pub discretionary_purpose: Option<String>,
}

/// One slice of the category breakdown chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// One bucket of the monthly trend chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyData {
    /// "YYYY-MM"
    pub month: String,
    pub total: f64,
}

/// Dashboard summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_expenses: f64,
    pub total_budget: f64,
    pub total_spent: f64,
    pub budget_remaining: f64,
    pub categories_count: i64,
    pub transactions_count: i64,
    pub recurring_expenses_count: i64,
    pub top_category: Option<CategoryData>,
    pub over_budget_categories: i64,
}

/// An audit log entry (API access record)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_email: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}
