//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rusqlite::params;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_expense(category_id: i64, amount: f64, day: &str) -> NewExpense {
        NewExpense {
            category_id,
            amount,
            description: "test expense".into(),
            date: date(day),
            is_recurring: false,
            recurring_frequency: None,
        }
    }

    /// Create a user and return (user, food category id)
    fn setup_user(db: &Database) -> (User, i64) {
        let user = db
            .create_user("test@example.com", "Test User", "password123", None)
            .unwrap();
        let categories = db.list_categories(user.id).unwrap();
        let food = categories
            .iter()
            .find(|c| c.name == "Food & Dining")
            .unwrap();
        (user, food.id)
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
    }

    #[test]
    fn test_create_user_seeds_default_categories() {
        let db = Database::in_memory().unwrap();
        let (user, _) = setup_user(&db);

        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.avatar.as_deref(), Some("T"));
        assert_eq!(user.currency, "USD");

        let categories = db.list_categories(user.id).unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(categories[0].name, "Food & Dining");
        assert_eq!(categories[0].color, "#FF6384");
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let db = Database::in_memory().unwrap();
        setup_user(&db);

        let result = db.create_user("test@example.com", "Other", "password123", None);
        assert!(matches!(result, Err(crate::Error::Conflict(_))));
    }

    #[test]
    fn test_short_password_rejected() {
        let db = Database::in_memory().unwrap();
        let result = db.create_user("a@b.com", "A", "short", None);
        assert!(matches!(result, Err(crate::Error::InvalidInput(_))));
    }

    #[test]
    fn test_password_verification() {
        let db = Database::in_memory().unwrap();
        let (user, _) = setup_user(&db);

        let verified = db
            .verify_password("test@example.com", "password123")
            .unwrap();
        assert_eq!(verified.id, user.id);

        // Wrong password and unknown email both come back Unauthorized
        assert!(matches!(
            db.verify_password("test@example.com", "wrong-password"),
            Err(crate::Error::Unauthorized(_))
        ));
        assert!(matches!(
            db.verify_password("nobody@example.com", "password123"),
            Err(crate::Error::Unauthorized(_))
        ));
    }

    #[test]
    fn test_duplicate_category_name_is_conflict() {
        let db = Database::in_memory().unwrap();
        let (user, _) = setup_user(&db);

        let result = db.create_category(user.id, "Food & Dining", "#123456");
        assert!(matches!(result, Err(crate::Error::Conflict(_))));

        // A different user may reuse the name
        let other = db
            .create_user("other@example.com", "Other", "password123", None)
            .unwrap();
        assert!(db.create_category(other.id, "Custom", "#123456").is_ok());
        assert!(db.create_category(user.id, "Custom", "#654321").is_ok());
    }

    #[test]
    fn test_expense_crud_scoped_by_user() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        let created = db
            .create_expense(user.id, &new_expense(food_id, 45.99, "2025-12-15"))
            .unwrap();
        assert!((created.expense.amount - 45.99).abs() < 1e-9);
        assert_eq!(created.category_name, "Food & Dining");

        // Another user cannot see or delete it
        let other = db
            .create_user("other@example.com", "Other", "password123", None)
            .unwrap();
        assert!(db.get_expense(other.id, created.expense.id).unwrap().is_none());
        assert!(matches!(
            db.delete_expense(other.id, created.expense.id),
            Err(crate::Error::NotFound(_))
        ));

        db.delete_expense(user.id, created.expense.id).unwrap();
        assert!(db.get_expense(user.id, created.expense.id).unwrap().is_none());
    }

    #[test]
    fn test_expense_amount_must_be_positive() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        for bad in [0.0, -5.0, f64::NAN] {
            let result = db.create_expense(user.id, &new_expense(food_id, bad, "2025-12-15"));
            assert!(matches!(result, Err(crate::Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_expense_frequency_requires_recurring_flag() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        let mut expense = new_expense(food_id, 10.0, "2025-12-15");
        expense.recurring_frequency = Some(RecurringFrequency::Monthly);
        // is_recurring is still false
        let result = db.create_expense(user.id, &expense);
        assert!(matches!(result, Err(crate::Error::InvalidInput(_))));

        expense.is_recurring = true;
        let created = db.create_expense(user.id, &expense).unwrap();
        assert_eq!(
            created.expense.recurring_frequency,
            Some(RecurringFrequency::Monthly)
        );
    }

    #[test]
    fn test_expense_with_unknown_category_is_not_found() {
        let db = Database::in_memory().unwrap();
        let (user, _) = setup_user(&db);

        let result = db.create_expense(user.id, &new_expense(9999, 10.0, "2025-12-15"));
        assert!(matches!(result, Err(crate::Error::NotFound(_))));
    }

    #[test]
    fn test_update_missing_expense_is_not_found() {
        let db = Database::in_memory().unwrap();
        let (user, _) = setup_user(&db);

        let result = db.update_expense(user.id, 424242, &ExpenseUpdate::default());
        assert!(matches!(result, Err(crate::Error::NotFound(_))));
    }

    #[test]
    fn test_budget_unique_per_category_and_month() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        db.create_budget(user.id, food_id, 500.0, "2025-12").unwrap();
        let duplicate = db.create_budget(user.id, food_id, 300.0, "2025-12");
        assert!(matches!(duplicate, Err(crate::Error::Conflict(_))));

        // Same category, different month is fine
        assert!(db.create_budget(user.id, food_id, 500.0, "2026-01").is_ok());
    }

    #[test]
    fn test_budget_validation() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        assert!(matches!(
            db.create_budget(user.id, food_id, -100.0, "2025-12"),
            Err(crate::Error::InvalidInput(_))
        ));
        assert!(matches!(
            db.create_budget(user.id, food_id, 100.0, "December"),
            Err(crate::Error::InvalidInput(_))
        ));
        assert!(matches!(
            db.create_budget(user.id, 9999, 100.0, "2025-12"),
            Err(crate::Error::NotFound(_))
        ));
    }

    #[test]
    fn test_budget_spent_recomputed_after_every_expense_mutation() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        // Pre-existing spend, then the budget is created
        db.create_expense(user.id, &new_expense(food_id, 245.99, "2025-12-03"))
            .unwrap();
        let budget = db.create_budget(user.id, food_id, 500.0, "2025-12").unwrap();
        assert!((budget.budget.spent - 245.99).abs() < 1e-9);

        // New expense shows up on the next read
        let e = db
            .create_expense(user.id, &new_expense(food_id, 50.0, "2025-12-10"))
            .unwrap();
        let budget = db.get_budget(user.id, budget.budget.id).unwrap().unwrap();
        assert!((budget.budget.spent - 295.99).abs() < 1e-9);
        assert!(!budget.budget.is_over_budget());

        // Editing the amount is reflected
        let update = ExpenseUpdate {
            amount: Some(350.0),
            ..Default::default()
        };
        db.update_expense(user.id, e.expense.id, &update).unwrap();
        let budget = db.get_budget(user.id, budget.budget.id).unwrap().unwrap();
        assert!((budget.budget.spent - 595.99).abs() < 1e-9);
        assert!(budget.budget.is_over_budget());

        // Deleting reverses it; spent can never drift below the real sum
        db.delete_expense(user.id, e.expense.id).unwrap();
        let budget = db.get_budget(user.id, budget.budget.id).unwrap().unwrap();
        assert!((budget.budget.spent - 245.99).abs() < 1e-9);
    }

    #[test]
    fn test_budget_spent_ignores_other_months_and_categories() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);
        let categories = db.list_categories(user.id).unwrap();
        let transport_id = categories
            .iter()
            .find(|c| c.name == "Transportation")
            .unwrap()
            .id;

        db.create_expense(user.id, &new_expense(food_id, 100.0, "2025-12-01"))
            .unwrap();
        db.create_expense(user.id, &new_expense(food_id, 75.0, "2025-11-28"))
            .unwrap();
        db.create_expense(user.id, &new_expense(transport_id, 120.0, "2025-12-01"))
            .unwrap();

        let budget = db.create_budget(user.id, food_id, 500.0, "2025-12").unwrap();
        assert!((budget.budget.spent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_spent_capability() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        db.create_expense(user.id, &new_expense(food_id, 100.0, "2025-12-01"))
            .unwrap();
        db.create_expense(user.id, &new_expense(food_id, 75.0, "2025-11-28"))
            .unwrap();

        let all = db.current_spent(user.id, food_id, None).unwrap();
        assert!((all - 175.0).abs() < 1e-9);

        let december = db
            .current_spent(user.id, food_id, Some("2025-12"))
            .unwrap();
        assert!((december - 100.0).abs() < 1e-9);

        // Empty scope sums to zero, not an error
        let empty = db.current_spent(user.id, food_id, Some("2020-01")).unwrap();
        assert_eq!(empty, 0.0);
    }

    #[test]
    fn test_budget_update_and_month_clash() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        let b1 = db.create_budget(user.id, food_id, 500.0, "2025-12").unwrap();
        db.create_budget(user.id, food_id, 400.0, "2026-01").unwrap();

        let updated = db
            .update_budget(user.id, b1.budget.id, Some(600.0), None)
            .unwrap();
        assert!((updated.budget.limit_amount - 600.0).abs() < 1e-9);

        // Moving b1 onto the other budget's month is a conflict
        let clash = db.update_budget(user.id, b1.budget.id, None, Some("2026-01"));
        assert!(matches!(clash, Err(crate::Error::Conflict(_))));
    }

    #[test]
    fn test_financial_plan_upsert_overwrites() {
        let db = Database::in_memory().unwrap();
        let (user, _) = setup_user(&db);

        assert!(db.get_financial_plan(user.id).unwrap().is_none());

        let plan = NewFinancialPlan {
            goal: "Pay off student loans".into(),
            monthly_income: 5000.0,
            currency: "USD".into(),
            structured_plan: "Aggressively pay down principal.".into(),
            essential_expenses: 2000.0,
            essential_purpose: Some("Rent and food".into()),
            savings: 1000.0,
            savings_purpose: Some("Extra loan payments".into()),
            discretionary_spending: 1500.0,
            discretionary_purpose: Some("Everything else".into()),
        };
        let saved = db.upsert_financial_plan(user.id, &plan).unwrap();
        assert_eq!(saved.goal, "Pay off student loans");

        let replacement = NewFinancialPlan {
            goal: "Build an emergency fund".into(),
            monthly_income: 5200.0,
            ..plan
        };
        let saved = db.upsert_financial_plan(user.id, &replacement).unwrap();
        assert_eq!(saved.goal, "Build an emergency fund");
        assert!((saved.monthly_income - 5200.0).abs() < 1e-9);

        // Still exactly one row
        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM financial_plans WHERE user_id = ?",
                params![user.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_deleting_user_cascades_to_owned_rows() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        db.create_expense(user.id, &new_expense(food_id, 45.99, "2025-12-15"))
            .unwrap();
        db.create_budget(user.id, food_id, 500.0, "2025-12").unwrap();
        db.upsert_financial_plan(
            user.id,
            &NewFinancialPlan {
                goal: "Goal".into(),
                monthly_income: 1000.0,
                currency: "USD".into(),
                structured_plan: "Plan".into(),
                essential_expenses: 500.0,
                essential_purpose: None,
                savings: 200.0,
                savings_purpose: None,
                discretionary_spending: 300.0,
                discretionary_purpose: None,
            },
        )
        .unwrap();

        db.delete_user(user.id).unwrap();

        let conn = db.conn().unwrap();
        for table in ["categories", "expenses", "budgets", "financial_plans"] {
            let count: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM {} WHERE user_id = ?", table),
                    params![user.id],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 0, "{} rows should cascade on user delete", table);
        }
    }

    #[test]
    fn test_deleting_category_cascades_to_expenses_and_budgets() {
        let db = Database::in_memory().unwrap();
        let (user, food_id) = setup_user(&db);

        db.create_expense(user.id, &new_expense(food_id, 45.99, "2025-12-15"))
            .unwrap();
        db.create_budget(user.id, food_id, 500.0, "2025-12").unwrap();

        db.delete_category(user.id, food_id).unwrap();

        assert_eq!(db.count_expenses(user.id).unwrap(), 0);
        assert_eq!(db.count_budgets(user.id).unwrap(), 0);
    }

    #[test]
    fn test_audit_log_roundtrip() {
        let db = Database::in_memory().unwrap();

        db.log_audit("test@example.com", "create", Some("expense"), Some(1), None)
            .unwrap();
        db.log_audit("test@example.com", "list", Some("budget"), None, Some("count=2"))
            .unwrap();

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].action, "list");
        assert_eq!(entries[1].entity_type.as_deref(), Some("expense"));
    }
}
