//! Demo data seeding
//!
//! Creates a demo account with a realistic spread of expenses and
//! budgets so the dashboard has something to show out of the box.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use budgetbuddy_core::db::Database;
use budgetbuddy_core::models::{NewExpense, RecurringFrequency};

use super::open_db;

/// Sample expenses: (amount, description, category, date, frequency)
const SAMPLE_EXPENSES: [(f64, &str, &str, &str, Option<&str>); 8] = [
    (45.99, "Grocery shopping", "Food & Dining", "2025-12-15", None),
    (120.0, "Monthly bus pass", "Transportation", "2025-12-01", Some("monthly")),
    (89.99, "New headphones", "Shopping", "2025-12-10", None),
    (15.99, "Netflix subscription", "Entertainment", "2025-12-05", Some("monthly")),
    (85.0, "Electric bill", "Bills & Utilities", "2025-12-03", Some("monthly")),
    (200.0, "Doctor visit", "Healthcare", "2025-11-28", None),
    (35.0, "Online course", "Education", "2025-11-20", None),
    (250.0, "Weekend trip", "Travel", "2025-11-15", None),
];

/// Sample budgets for December: (category, limit)
const SAMPLE_BUDGETS: [(&str, f64); 8] = [
    ("Food & Dining", 500.0),
    ("Transportation", 200.0),
    ("Shopping", 300.0),
    ("Entertainment", 150.0),
    ("Bills & Utilities", 400.0),
    ("Healthcare", 200.0),
    ("Education", 100.0),
    ("Travel", 500.0),
];

const SAMPLE_BUDGET_MONTH: &str = "2025-12";

pub fn cmd_seed(db_path: &Path, email: &str, password: &str, no_encrypt: bool) -> Result<()> {
    println!("🌱 Seeding demo data at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    seed_demo_user(&db, email, password)?;

    println!("✅ Demo user ready: {} (password: {})", email, password);
    println!();
    println!("Next: budgetbuddy serve, then sign in with the demo account.");

    Ok(())
}

/// Create the demo user (if absent) and populate sample data
pub fn seed_demo_user(db: &Database, email: &str, password: &str) -> Result<()> {
    if db.get_user_by_email(email)?.is_some() {
        println!("   Demo user already exists, skipping");
        return Ok(());
    }

    let user = db
        .create_user(email, "Demo User", password, None)
        .context("Failed to create demo user")?;

    let categories = db.list_categories(user.id)?;
    let category_id = |name: &str| -> Result<i64> {
        categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .with_context(|| format!("Missing default category '{}'", name))
    };

    for (amount, description, category, date, frequency) in SAMPLE_EXPENSES {
        let recurring_frequency = frequency
            .map(RecurringFrequency::from_str)
            .transpose()
            .ok()
            .flatten();
        db.create_expense(
            user.id,
            &NewExpense {
                category_id: category_id(category)?,
                amount,
                description: description.to_string(),
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .context("Invalid sample date")?,
                is_recurring: recurring_frequency.is_some(),
                recurring_frequency,
            },
        )?;
    }
    println!("   Seeded {} expenses", SAMPLE_EXPENSES.len());

    for (category, limit) in SAMPLE_BUDGETS {
        db.create_budget(user.id, category_id(category)?, limit, SAMPLE_BUDGET_MONTH)?;
    }
    println!("   Seeded {} budgets for {}", SAMPLE_BUDGETS.len(), SAMPLE_BUDGET_MONTH);

    Ok(())
}
