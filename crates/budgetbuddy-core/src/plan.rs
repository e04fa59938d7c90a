//! Plan allocation calculator
//!
//! Converts a financial plan's absolute dollar amounts into percentages
//! of monthly income, plus the unallocated remainder. Pure transforms,
//! no persistence.

use serde::{Deserialize, Serialize};

use crate::models::FinancialPlan;

/// Percentage view of a financial plan's income split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAllocation {
    pub essential_pct: f64,
    pub savings_pct: f64,
    pub discretionary_pct: f64,
    /// Sum of the three allocation amounts
    pub total_allocated: f64,
    /// income - total_allocated; negative when over-allocated
    pub unallocated: f64,
    /// Share of income not covered by the plan; 0 when over-allocated
    /// (over-allocation is surfaced via `over_allocated`, not a negative
    /// bar segment)
    pub unallocated_pct: f64,
    pub over_allocated: bool,
}

impl PlanAllocation {
    /// Derive the percentage split from a plan's dollar amounts
    ///
    /// Zero (or missing) income defines every percentage as 0 rather than
    /// dividing by zero.
    pub fn from_plan(plan: &FinancialPlan) -> Self {
        let income = plan.monthly_income;
        let total_allocated = plan.essential_expenses + plan.savings + plan.discretionary_spending;
        let unallocated = income - total_allocated;

        if income <= 0.0 {
            return Self {
                essential_pct: 0.0,
                savings_pct: 0.0,
                discretionary_pct: 0.0,
                total_allocated,
                unallocated,
                unallocated_pct: 0.0,
                over_allocated: total_allocated > income,
            };
        }

        let pct = |amount: f64| (amount / income) * 100.0;

        Self {
            essential_pct: pct(plan.essential_expenses),
            savings_pct: pct(plan.savings),
            discretionary_pct: pct(plan.discretionary_spending),
            total_allocated,
            unallocated,
            unallocated_pct: if unallocated > 0.0 {
                pct(unallocated)
            } else {
                0.0
            },
            over_allocated: unallocated < 0.0,
        }
    }
}

/// Realized savings for the current snapshot: income minus actual spend
///
/// Not the same quantity as the plan's `savings` field, which is the
/// AI-recommended target.
pub fn actual_savings(monthly_income: f64, total_expenses: f64) -> f64 {
    monthly_income - total_expenses
}
