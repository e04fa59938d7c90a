//! Aggregation engine: derived, read-only views over expense/budget snapshots
//!
//! Every function here is a pure pass over already-fetched records. Same
//! input produces the same output, nothing is persisted, and empty input
//! yields zero/empty defaults rather than an error.

use crate::models::{
    AnalyticsSummary, BudgetUtilization, BudgetWithCategory, CategoryData, ExpenseWithCategory,
    MonthlyData, RecurringFrequency,
};

/// Color substituted when an expense's category has no stored color
pub const DEFAULT_CATEGORY_COLOR: &str = "#607D8B";

/// Sum of all expense amounts; 0 for an empty set
pub fn total_expenses(expenses: &[ExpenseWithCategory]) -> f64 {
    expenses.iter().map(|e| e.expense.amount).sum()
}

/// Per-category totals paired with the category's display color
///
/// Categories appear in order of first occurrence in the input, not
/// sorted; callers wanting top-N must sort (or use [`top_category`]).
pub fn expenses_by_category(expenses: &[ExpenseWithCategory]) -> Vec<CategoryData> {
    let mut breakdown: Vec<CategoryData> = Vec::new();

    for e in expenses {
        match breakdown
            .iter_mut()
            .find(|c| c.name == e.category_name)
        {
            Some(entry) => entry.value += e.expense.amount,
            None => breakdown.push(CategoryData {
                name: e.category_name.clone(),
                value: e.expense.amount,
                color: e
                    .category_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            }),
        }
    }

    breakdown
}

/// Totals bucketed by month ("YYYY-MM"), ascending
///
/// The month key is the first 7 characters of the ISO date, so a plain
/// lexicographic sort is chronological.
pub fn monthly_expenses(expenses: &[ExpenseWithCategory]) -> Vec<MonthlyData> {
    let mut buckets: Vec<MonthlyData> = Vec::new();

    for e in expenses {
        let month: String = e.expense.date.to_string().chars().take(7).collect();
        match buckets.iter_mut().find(|b| b.month == month) {
            Some(bucket) => bucket.total += e.expense.amount,
            None => buckets.push(MonthlyData {
                month,
                total: e.expense.amount,
            }),
        }
    }

    buckets.sort_by(|a, b| a.month.cmp(&b.month));
    buckets
}

/// Just the recurring expenses, no aggregation
pub fn recurring_expenses(expenses: &[ExpenseWithCategory]) -> Vec<ExpenseWithCategory> {
    expenses
        .iter()
        .filter(|e| e.expense.is_recurring)
        .cloned()
        .collect()
}

/// Project one charge to a yearly cost
///
/// A missing frequency passes the amount through unchanged (treated as
/// already annual), matching the observed dashboard behavior.
pub fn annualized_cost(amount: f64, frequency: Option<RecurringFrequency>) -> f64 {
    match frequency {
        Some(f) => amount * f.annual_multiplier(),
        None => amount,
    }
}

/// Budgets strictly past their limit; exactly at the limit is excluded
pub fn over_budget(budgets: &[BudgetWithCategory]) -> Vec<&BudgetWithCategory> {
    budgets.iter().filter(|b| b.budget.is_over_budget()).collect()
}

/// Budget usage for display
///
/// `percent_bar` is clamped for progress bars; `percent_used` and
/// `remaining` are raw so over-spend shows in the numbers.
pub fn utilization(budget: &BudgetWithCategory) -> BudgetUtilization {
    let b = &budget.budget;
    let percent_used = if b.limit_amount > 0.0 {
        (b.spent / b.limit_amount) * 100.0
    } else {
        0.0
    };
    BudgetUtilization {
        percent_used,
        percent_bar: percent_used.min(100.0),
        remaining: b.remaining(),
    }
}

/// The largest category slice; ties go to the first maximum encountered
pub fn top_category(breakdown: &[CategoryData]) -> Option<&CategoryData> {
    breakdown
        .iter()
        .fold(None, |best: Option<&CategoryData>, entry| match best {
            Some(b) if b.value >= entry.value => Some(b),
            _ => Some(entry),
        })
}

/// Assemble the dashboard summary from one user's snapshot
pub fn summary(
    expenses: &[ExpenseWithCategory],
    budgets: &[BudgetWithCategory],
    categories_count: i64,
) -> AnalyticsSummary {
    let total_budget: f64 = budgets.iter().map(|b| b.budget.limit_amount).sum();
    let total_spent: f64 = budgets.iter().map(|b| b.budget.spent).sum();
    let breakdown = expenses_by_category(expenses);

    AnalyticsSummary {
        total_expenses: total_expenses(expenses),
        total_budget,
        total_spent,
        budget_remaining: total_budget - total_spent,
        categories_count,
        transactions_count: expenses.len() as i64,
        recurring_expenses_count: expenses.iter().filter(|e| e.expense.is_recurring).count()
            as i64,
        top_category: top_category(&breakdown).cloned(),
        over_budget_categories: over_budget(budgets).len() as i64,
    }
}
