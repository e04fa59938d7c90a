//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use budgetbuddy_core::ai::{AIClient, MockBackend};
use budgetbuddy_core::db::Database;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        jwt_secret: "test-secret".into(),
        allowed_origins: vec![],
    }
}

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router_with_ai(
        db,
        None,
        test_config(),
        Some(AIClient::Mock(MockBackend::new())),
    )
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user and return their bearer token
async fn register(app: &Router, email: &str) -> String {
    let body = serde_json::json!({
        "name": "Test User",
        "email": email,
        "password": "password123"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

/// Issue an authenticated request with a JSON body
async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json");

    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };

    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Find a category id by name via the API
async fn category_id(app: &Router, token: &str, name: &str) -> i64 {
    let response = request_json(app, "GET", "/api/categories", token, None).await;
    let json = get_body_json(response).await;
    json.as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .unwrap()["id"]
        .as_i64()
        .unwrap()
}

// ========== Auth Tests ==========

#[tokio::test]
async fn test_register_returns_token_and_seeds_categories() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    let response = request_json(&app, "GET", "/api/categories", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let app = setup_test_app();
    register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "name": "Imposter",
        "email": "alice@example.com",
        "password": "password123"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = setup_test_app();
    register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "email": "alice@example.com",
        "password": "password123"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let token = json["token"].as_str().unwrap();
    assert!(json["user"]["password_hash"].is_null());

    let response = request_json(&app, "GET", "/api/me", token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["email"], "alice@example.com");
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = setup_test_app();
    register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "email": "alice@example.com",
        "password": "not-the-password"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_test_app();

    for uri in [
        "/api/me",
        "/api/expenses",
        "/api/budgets",
        "/api/analytics/summary",
        "/api/plan",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_expense_crud() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;
    let food = category_id(&app, &token, "Food & Dining").await;

    // Create
    let body = serde_json::json!({
        "category_id": food,
        "amount": 45.99,
        "description": "Grocery shopping",
        "date": "2025-12-15"
    });
    let response = request_json(&app, "POST", "/api/expenses", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    assert_eq!(created["category_name"], "Food & Dining");
    let id = created["id"].as_i64().unwrap();

    // Read
    let response =
        request_json(&app, "GET", &format!("/api/expenses/{}", id), &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Update
    let response = request_json(
        &app,
        "PUT",
        &format!("/api/expenses/{}", id),
        &token,
        Some(serde_json::json!({"amount": 50.0})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = get_body_json(response).await;
    assert_eq!(updated["amount"], 50.0);

    // Delete
    let response =
        request_json(&app, "DELETE", &format!("/api/expenses/{}", id), &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Gone
    let response =
        request_json(&app, "GET", &format!("/api/expenses/{}", id), &token, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_expense_amount_is_bad_request() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;
    let food = category_id(&app, &token, "Food & Dining").await;

    let body = serde_json::json!({
        "category_id": food,
        "amount": -10.0,
        "description": "Refund?",
        "date": "2025-12-15"
    });
    let response = request_json(&app, "POST", "/api/expenses", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expenses_are_isolated_per_user() {
    let app = setup_test_app();
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let food = category_id(&app, &alice, "Food & Dining").await;

    let body = serde_json::json!({
        "category_id": food,
        "amount": 45.99,
        "description": "Alice's groceries",
        "date": "2025-12-15"
    });
    let response = request_json(&app, "POST", "/api/expenses", &alice, Some(body)).await;
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    // Bob cannot see Alice's expense
    let response = request_json(&app, "GET", &format!("/api/expenses/{}", id), &bob, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = request_json(&app, "GET", "/api/expenses", &bob, None).await;
    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_budget_spent_recomputes_across_expense_lifecycle() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;
    let food = category_id(&app, &token, "Food & Dining").await;

    // Existing expense before the budget is created
    let body = serde_json::json!({
        "category_id": food,
        "amount": 245.99,
        "description": "Groceries",
        "date": "2025-12-03"
    });
    request_json(&app, "POST", "/api/expenses", &token, Some(body)).await;

    // Budget picks up the pre-existing spend
    let body = serde_json::json!({
        "category_id": food,
        "limit_amount": 500.0,
        "month": "2025-12"
    });
    let response = request_json(&app, "POST", "/api/budgets", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let budget = get_body_json(response).await;
    assert_eq!(budget["spent"], 245.99);
    assert_eq!(budget["over_budget"], false);
    let budget_id = budget["id"].as_i64().unwrap();

    // A new expense is reflected on the next read
    let body = serde_json::json!({
        "category_id": food,
        "amount": 50.0,
        "description": "More groceries",
        "date": "2025-12-10"
    });
    let response = request_json(&app, "POST", "/api/expenses", &token, Some(body)).await;
    let expense_id = get_body_json(response).await["id"].as_i64().unwrap();

    let response =
        request_json(&app, "GET", &format!("/api/budgets/{}", budget_id), &token, None).await;
    let budget = get_body_json(response).await;
    assert!((budget["spent"].as_f64().unwrap() - 295.99).abs() < 1e-9);
    assert_eq!(budget["over_budget"], false);

    // Deleting the expense reverses it
    request_json(&app, "DELETE", &format!("/api/expenses/{}", expense_id), &token, None).await;
    let response =
        request_json(&app, "GET", &format!("/api/budgets/{}", budget_id), &token, None).await;
    let budget = get_body_json(response).await;
    assert!((budget["spent"].as_f64().unwrap() - 245.99).abs() < 1e-9);
}

#[tokio::test]
async fn test_duplicate_budget_is_conflict() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;
    let food = category_id(&app, &token, "Food & Dining").await;

    let body = serde_json::json!({
        "category_id": food,
        "limit_amount": 500.0,
        "month": "2025-12"
    });
    let response = request_json(&app, "POST", "/api/budgets", &token, Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request_json(&app, "POST", "/api/budgets", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_budget_utilization_fields() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;
    let food = category_id(&app, &token, "Food & Dining").await;

    let body = serde_json::json!({
        "category_id": food,
        "amount": 150.0,
        "description": "Blowout dinner",
        "date": "2025-12-01"
    });
    request_json(&app, "POST", "/api/expenses", &token, Some(body)).await;

    let body = serde_json::json!({
        "category_id": food,
        "limit_amount": 100.0,
        "month": "2025-12"
    });
    let response = request_json(&app, "POST", "/api/budgets", &token, Some(body)).await;
    let budget = get_body_json(response).await;

    // Raw percent keeps the overshoot, the bar is clamped
    assert_eq!(budget["over_budget"], true);
    assert_eq!(budget["utilization"]["percent_used"], 150.0);
    assert_eq!(budget["utilization"]["percent_bar"], 100.0);
    assert_eq!(budget["utilization"]["remaining"], -50.0);
}

// ========== Analytics API Tests ==========

#[tokio::test]
async fn test_analytics_endpoints() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;
    let food = category_id(&app, &token, "Food & Dining").await;
    let transport = category_id(&app, &token, "Transportation").await;

    for (cat, amount, date, recurring) in [
        (food, 45.99, "2025-12-15", false),
        (transport, 120.0, "2025-12-01", true),
        (food, 200.0, "2025-11-28", false),
    ] {
        let mut body = serde_json::json!({
            "category_id": cat,
            "amount": amount,
            "description": "expense",
            "date": date
        });
        if recurring {
            body["is_recurring"] = serde_json::json!(true);
            body["recurring_frequency"] = serde_json::json!("monthly");
        }
        request_json(&app, "POST", "/api/expenses", &token, Some(body)).await;
    }

    // Summary
    let response = request_json(&app, "GET", "/api/analytics/summary", &token, None).await;
    let summary = get_body_json(response).await;
    assert_eq!(summary["transactions_count"], 3);
    assert_eq!(summary["recurring_expenses_count"], 1);
    assert_eq!(summary["top_category"]["name"], "Food & Dining");

    // Category breakdown partitions the total
    let response = request_json(&app, "GET", "/api/analytics/categories", &token, None).await;
    let breakdown = get_body_json(response).await;
    let sum: f64 = breakdown
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["value"].as_f64().unwrap())
        .sum();
    assert!((sum - summary["total_expenses"].as_f64().unwrap()).abs() < 1e-9);

    // Monthly trend is ascending
    let response = request_json(&app, "GET", "/api/analytics/monthly", &token, None).await;
    let monthly = get_body_json(response).await;
    let months: Vec<&str> = monthly
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["month"].as_str().unwrap())
        .collect();
    assert_eq!(months, vec!["2025-11", "2025-12"]);

    // Recurring report annualizes the bus pass
    let response = request_json(&app, "GET", "/api/analytics/recurring", &token, None).await;
    let recurring = get_body_json(response).await;
    assert_eq!(recurring["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(recurring["total_monthly"], 120.0);
    assert_eq!(recurring["total_annual_cost"], 1440.0);
}

// ========== Plan API Tests ==========

#[tokio::test]
async fn test_plan_absent_then_saved() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    let response = request_json(&app, "GET", "/api/plan", &token, None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["has_plan"], false);

    let body = serde_json::json!({
        "goal": "Save for a house",
        "monthly_income": 5000.0,
        "currency": "USD",
        "structured_plan": "Save aggressively.",
        "essential_expenses": 2000.0,
        "essential_purpose": "Rent and groceries",
        "savings": 1000.0,
        "savings_purpose": "House deposit",
        "discretionary_spending": 1500.0,
        "discretionary_purpose": "Leisure"
    });
    let response = request_json(&app, "POST", "/api/plan", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request_json(&app, "GET", "/api/plan", &token, None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["has_plan"], true);
    assert_eq!(json["plan"]["goal"], "Save for a house");
}

#[tokio::test]
async fn test_plan_allocation_percentages() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "goal": "Save for a house",
        "monthly_income": 5000.0,
        "currency": "USD",
        "structured_plan": "Save aggressively.",
        "essential_expenses": 2000.0,
        "savings": 1000.0,
        "discretionary_spending": 1500.0
    });
    request_json(&app, "POST", "/api/plan", &token, Some(body)).await;

    let response = request_json(&app, "GET", "/api/plan/allocation", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["allocation"]["essential_pct"], 40.0);
    assert_eq!(json["allocation"]["savings_pct"], 20.0);
    assert_eq!(json["allocation"]["discretionary_pct"], 30.0);
    assert_eq!(json["allocation"]["unallocated"], 500.0);
    assert_eq!(json["allocation"]["unallocated_pct"], 10.0);
    // No expenses yet: realized savings equal the full income
    assert_eq!(json["actual_savings"], 5000.0);
}

#[tokio::test]
async fn test_generate_plan_with_mock_backend() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "goal": "Emergency fund",
        "monthly_income": 4000.0,
        "currency": "USD"
    });
    let response = request_json(&app, "POST", "/api/plan/generate", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let plan = &json["plan"];
    let total = plan["essential_expenses"].as_f64().unwrap()
        + plan["savings"].as_f64().unwrap()
        + plan["discretionary_spending"].as_f64().unwrap();
    assert!((total - 4000.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_generate_plan_without_backend_is_unavailable() {
    let db = Database::in_memory().unwrap();
    let app = create_router_with_ai(db, None, test_config(), None);
    let token = register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "goal": "Emergency fund",
        "monthly_income": 4000.0,
        "currency": "USD"
    });
    let response = request_json(&app, "POST", "/api/plan/generate", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ========== Chat API Tests ==========

#[tokio::test]
async fn test_chat_requires_plan() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    let body = serde_json::json!({"message": "How am I doing?"});
    let response = request_json(&app, "POST", "/api/chat", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_with_plan_replies() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    let body = serde_json::json!({
        "goal": "Save for a house",
        "monthly_income": 5000.0,
        "currency": "USD",
        "structured_plan": "Save aggressively.",
        "essential_expenses": 2000.0,
        "savings": 1000.0,
        "discretionary_spending": 1500.0
    });
    request_json(&app, "POST", "/api/plan", &token, Some(body)).await;

    let body = serde_json::json!({
        "message": "How am I doing?",
        "conversation_history": [
            {"role": "user", "content": "Hi"},
            {"role": "assistant", "content": "Hello!"}
        ]
    });
    let response = request_json(&app, "POST", "/api/chat", &token, Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["reply"].as_str().unwrap().contains("How am I doing?"));
    assert_eq!(json["model"], "mock");
}

// ========== Audit API Tests ==========

#[tokio::test]
async fn test_audit_log_records_access() {
    let app = setup_test_app();
    let token = register(&app, "alice@example.com").await;

    request_json(&app, "GET", "/api/expenses", &token, None).await;

    let response = request_json(&app, "GET", "/api/audit?limit=10", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let entries = json.as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["action"] == "list" && e["entity_type"] == "expense"));
    assert!(entries.iter().any(|e| e["action"] == "register"));
}
