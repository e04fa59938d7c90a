//! BudgetBuddy Web Server
//!
//! Axum-based REST API for the BudgetBuddy personal finance application.
//!
//! Security features:
//! - Bearer-token (JWT) authentication for all user-scoped routes
//! - Restrictive CORS policy
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use budgetbuddy_core::ai::AIClient;
use budgetbuddy_core::db::Database;
use budgetbuddy_core::models::User;

mod handlers;

/// Environment variable holding the JWT signing secret
pub const JWT_SECRET_ENV: &str = "BUDGETBUDDY_JWT_SECRET";

/// Token lifetime: 7 days
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Secret used to sign and validate bearer tokens
    pub jwt_secret: String,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let jwt_secret = std::env::var(JWT_SECRET_ENV).unwrap_or_else(|_| {
            warn!(
                "{} not set - using an insecure default secret. \
                 Do not expose this server to a network.",
                JWT_SECRET_ENV
            );
            "change-me-in-production".to_string()
        });
        Self {
            jwt_secret,
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub ai: Option<AIClient>,
}

/// JWT claims for a signed-in user
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: i64,
    email: String,
    exp: i64,
}

/// The authenticated user, injected into request extensions by the
/// auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

/// Issue a bearer token for a user
pub fn issue_token(user: &User, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign token");
        AppError::internal("Failed to issue token")
    })
}

/// Authentication middleware - validates the bearer token and injects
/// the acting user
///
/// Every user-scoped route sits behind this; a missing or invalid token
/// is a 401, never a crash.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => {
            warn!(path = %request.uri().path(), "Unauthorized request - no bearer token");
            return unauthorized_response();
        }
    };

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    );

    match decoded {
        Ok(data) => {
            request.extensions_mut().insert(AuthUser {
                user_id: data.claims.sub,
                email: data.claims.email,
            });
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "Unauthorized request - invalid token");
            unauthorized_response()
        }
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    // Create AI client if configured
    let ai = AIClient::from_env();
    if let Some(ref client) = ai {
        info!(
            "AI backend configured: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        info!("ℹ️  AI backend not configured (set OPENAI_COMPATIBLE_HOST to enable AI features)");
    }

    create_router_with_ai(db, static_dir, config, ai)
}

/// Create the application router with an explicit AI client (for testing)
pub fn create_router_with_ai(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    ai: Option<AIClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        ai,
    });

    // Registration and login are the only routes reachable without a token
    let public_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    let protected_routes = Router::new()
        // Auth
        .route("/me", get(handlers::get_me))
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            axum::routing::delete(handlers::delete_category),
        )
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/:id",
            get(handlers::get_budget)
                .put(handlers::update_budget)
                .delete(handlers::delete_budget),
        )
        // Analytics
        .route("/analytics/summary", get(handlers::analytics_summary))
        .route("/analytics/categories", get(handlers::analytics_categories))
        .route("/analytics/monthly", get(handlers::analytics_monthly))
        .route("/analytics/recurring", get(handlers::analytics_recurring))
        // Financial plan
        .route("/plan", get(handlers::get_plan).post(handlers::save_plan))
        .route("/plan/generate", post(handlers::generate_plan))
        .route("/plan/allocation", get(handlers::get_plan_allocation))
        // Chat assistant
        .route("/chat", post(handlers::chat))
        // Audit log
        .route("/audit", get(handlers::list_audit_log))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow blob: for images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Check AI backend connection
    check_ai_connection().await;

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection() {
    match AIClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured (set OPENAI_COMPATIBLE_HOST to enable AI features)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// Map core errors onto the HTTP taxonomy: NotFound→404, Conflict→409,
/// InvalidInput→400, Unauthorized→401, everything else→sanitized 500.
impl From<budgetbuddy_core::Error> for AppError {
    fn from(err: budgetbuddy_core::Error) -> Self {
        use budgetbuddy_core::Error as E;
        match err {
            E::NotFound(msg) => Self::not_found(&msg),
            E::Conflict(msg) => Self::conflict(&msg),
            E::InvalidInput(msg) => Self::bad_request(&msg),
            E::Unauthorized(msg) => Self::unauthorized(&msg),
            other => {
                // Log the full internal error, return a generic message
                error!(error = %other, "Internal error");
                Self::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests;
