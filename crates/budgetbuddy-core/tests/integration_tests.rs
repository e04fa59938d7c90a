//! Integration tests for budgetbuddy-core
//!
//! These tests exercise the full register → spend → budget → analytics
//! workflow against a real (temp-file) database.

use chrono::NaiveDate;

use budgetbuddy_core::analytics;
use budgetbuddy_core::db::Database;
use budgetbuddy_core::models::{ExpenseUpdate, NewExpense, NewFinancialPlan, RecurringFrequency};
use budgetbuddy_core::plan::{actual_savings, PlanAllocation};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn expense(category_id: i64, amount: f64, description: &str, day: &str) -> NewExpense {
    NewExpense {
        category_id,
        amount,
        description: description.into(),
        date: date(day),
        is_recurring: false,
        recurring_frequency: None,
    }
}

#[test]
fn test_full_budgeting_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");

    let user = db
        .create_user("workflow@example.com", "Workflow", "password123", None)
        .unwrap();

    let categories = db.list_categories(user.id).unwrap();
    let food = categories.iter().find(|c| c.name == "Food & Dining").unwrap().id;
    let transport = categories
        .iter()
        .find(|c| c.name == "Transportation")
        .unwrap()
        .id;

    // Record spending across two categories and two months
    db.create_expense(user.id, &expense(food, 45.99, "Groceries", "2025-12-15"))
        .unwrap();
    db.create_expense(
        user.id,
        &NewExpense {
            category_id: transport,
            amount: 120.0,
            description: "Monthly bus pass".into(),
            date: date("2025-12-01"),
            is_recurring: true,
            recurring_frequency: Some(RecurringFrequency::Monthly),
        },
    )
    .unwrap();
    db.create_expense(user.id, &expense(food, 200.0, "Holiday dinner", "2025-11-28"))
        .unwrap();

    // Budgets pick up existing December spending at creation
    let food_budget = db.create_budget(user.id, food, 500.0, "2025-12").unwrap();
    assert!((food_budget.budget.spent - 45.99).abs() < 1e-9);
    let transport_budget = db.create_budget(user.id, transport, 100.0, "2025-12").unwrap();
    assert!(transport_budget.budget.is_over_budget());

    // Aggregations over the snapshot
    let expenses = db.list_expenses(user.id).unwrap();
    assert!((analytics::total_expenses(&expenses) - 365.99).abs() < 1e-9);

    let breakdown = analytics::expenses_by_category(&expenses);
    let breakdown_total: f64 = breakdown.iter().map(|c| c.value).sum();
    assert!((breakdown_total - 365.99).abs() < 1e-9);

    let monthly = analytics::monthly_expenses(&expenses);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].month, "2025-11");
    assert_eq!(monthly[1].month, "2025-12");

    let budgets = db.list_budgets(user.id).unwrap();
    let over = analytics::over_budget(&budgets);
    assert_eq!(over.len(), 1);
    assert_eq!(over[0].category_name, "Transportation");

    // Editing an expense into another category moves the spend on next read
    let groceries = expenses
        .iter()
        .find(|e| e.expense.description == "Groceries")
        .unwrap();
    db.update_expense(
        user.id,
        groceries.expense.id,
        &ExpenseUpdate {
            category_id: Some(transport),
            ..Default::default()
        },
    )
    .unwrap();

    let food_budget = db.get_budget(user.id, food_budget.budget.id).unwrap().unwrap();
    assert_eq!(food_budget.budget.spent, 0.0);
    let transport_budget = db
        .get_budget(user.id, transport_budget.budget.id)
        .unwrap()
        .unwrap();
    assert!((transport_budget.budget.spent - 165.99).abs() < 1e-9);
}

#[test]
fn test_plan_workflow() {
    let db = Database::in_memory().unwrap();
    let user = db
        .create_user("planner@example.com", "Planner", "password123", None)
        .unwrap();

    let plan = db
        .upsert_financial_plan(
            user.id,
            &NewFinancialPlan {
                goal: "Save for a house".into(),
                monthly_income: 5000.0,
                currency: "USD".into(),
                structured_plan: "Save a fifth of income every month.".into(),
                essential_expenses: 2000.0,
                essential_purpose: Some("Rent, groceries".into()),
                savings: 1000.0,
                savings_purpose: Some("House deposit".into()),
                discretionary_spending: 1500.0,
                discretionary_purpose: Some("Leisure".into()),
            },
        )
        .unwrap();

    let allocation = PlanAllocation::from_plan(&plan);
    assert!((allocation.essential_pct - 40.0).abs() < 1e-9);
    assert!((allocation.unallocated - 500.0).abs() < 1e-9);

    // Realized savings reflect actual spending, not the plan's target
    let categories = db.list_categories(user.id).unwrap();
    let food = categories.iter().find(|c| c.name == "Food & Dining").unwrap().id;
    db.create_expense(user.id, &expense(food, 3200.0, "Everything", "2025-12-01"))
        .unwrap();

    let expenses = db.list_expenses(user.id).unwrap();
    let realized = actual_savings(plan.monthly_income, analytics::total_expenses(&expenses));
    assert!((realized - 1800.0).abs() < 1e-9);
    assert_ne!(realized, plan.savings);
}
