//! MiDinero Web Server
//!
//! Axum-based REST API serving the finance dashboard.
//!
//! Security features:
//! - Bearer JWT authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Bounded, validated query parameters
//! - Audit logging for every dashboard read and goal change
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
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use midinero_core::config::DashboardDefaults;
use midinero_core::db::Database;

mod handlers;

/// Authorization header carrying the bearer token
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// HS256 secret used to validate bearer tokens
    pub jwt_secret: Option<String>,
    /// User every request is bound to when auth is disabled
    pub dev_user_id: Option<i64>,
    /// Window sizes used when a request doesn't specify one
    pub dashboard: DashboardDefaults,
    /// Fixed "today" for report windows (defaults to the current UTC date)
    pub today: Option<NaiveDate>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            jwt_secret: None,
            dev_user_id: None,
            dashboard: DashboardDefaults::default(),
            today: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

impl AppState {
    /// Reference date for dashboard windows
    pub fn today(&self) -> NaiveDate {
        self.config.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// The authenticated user, inserted as a request extension by the auth
/// middleware and extracted by handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: i64,
    pub username: String,
}

/// JWT claims accepted by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: usize,
}

/// Authentication middleware - resolves the bearer JWT (or the dev user when
/// auth is disabled) into a [`UserContext`]
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let user_id = if state.config.require_auth {
        let token = request
            .headers()
            .get(AUTHORIZATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            warn!(path = %path, "Unauthorized request - missing bearer token");
            return AppError::unauthorized("Authentication credentials were not provided")
                .into_response();
        };

        let Some(secret) = state.config.jwt_secret.as_deref() else {
            warn!(path = %path, "Rejecting token - no JWT secret configured");
            return AppError::unauthorized("Invalid or expired token").into_response();
        };

        match validate_jwt(token, secret) {
            Ok(claims) => claims.user_id,
            Err(e) => {
                warn!(error = %e, path = %path, "Invalid bearer token");
                return AppError::unauthorized("Invalid or expired token").into_response();
            }
        }
    } else {
        match state.config.dev_user_id {
            Some(id) => id,
            None => {
                error!("Auth disabled but no development user configured");
                return AppError::internal("Server misconfigured").into_response();
            }
        }
    };

    let user = match state.db.get_user(user_id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(user_id, path = %path, "Token refers to an unknown user");
            return AppError::unauthorized("Invalid or expired token").into_response();
        }
        Err(e) => return AppError::from(e).into_response(),
    };

    tracing::debug!(user = %user.username, path = %path, "Authenticated request");
    request.extensions_mut().insert(UserContext {
        user_id: user.id,
        username: user.username,
    });
    next.run(request).await
}

/// Validate an HS256 token and return its claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT validation failed: {}", e))
}

/// GET /api/health - liveness probe (no auth)
async fn health() -> Json<ApiResponse<serde_json::Value>> {
    success(
        "OK",
        serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
    )
}

/// Create the API router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let cors = build_cors(&config.allowed_origins);
    let state = Arc::new(AppState { db, config });

    let dashboard_routes = Router::new()
        .route("/overview", get(handlers::dashboard_overview))
        .route("/trends", get(handlers::dashboard_trends))
        .route("/categories", get(handlers::dashboard_categories))
        .route("/patterns", get(handlers::dashboard_patterns))
        .route("/prediction", get(handlers::dashboard_prediction))
        .route("/budget-health", get(handlers::dashboard_budget_health))
        .route("/summary", get(handlers::dashboard_summary));

    let protected = Router::new()
        .nest("/finances/dashboard", dashboard_routes)
        .route(
            "/finances/goals",
            get(handlers::list_goals).post(handlers::set_goal),
        )
        .route(
            "/finances/goals/:goal_id/add-amount",
            post(handlers::add_goal_amount),
        )
        .route(
            "/finances/goals/:goal_id/progress",
            get(handlers::goal_progress),
        )
        .route("/auth/profile", get(handlers::get_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .merge(protected)
        .route("/health", get(health));

    // CSP: same-origin scripts, inline styles for the SPA
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
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

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if config.require_auth {
        if config.jwt_secret.is_none() {
            anyhow::bail!(
                "Authentication is enabled but no JWT secret is configured. \
                Set {} or use --no-auth for local development.",
                midinero_core::config::JWT_SECRET_ENV
            );
        }
    } else {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Response envelope
// ============================================================================

/// Uniform success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

pub(crate) fn success<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        status: "success",
        message: message.into(),
        data,
    })
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Field -> messages, reported for validation failures
    errors: Option<serde_json::Value>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            errors: None,
            internal: None,
        }
    }

    /// Validation failure on a single query parameter
    pub fn invalid_field(field: &str, msg: &str) -> Self {
        let mut errors = serde_json::Map::new();
        errors.insert(field.to_string(), serde_json::json!([msg]));
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid parameters".to_string(),
            errors: Some(serde_json::Value::Object(errors)),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            errors: None,
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            errors: None,
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            errors: None,
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "status": "error",
            "message": self.message,
            "errors": self.errors.unwrap_or_else(|| serde_json::json!({})),
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes surface as-is; everything else stays internal
        match err.downcast_ref::<midinero_core::Error>() {
            Some(midinero_core::Error::InvalidData(msg)) => return Self::bad_request(msg),
            Some(midinero_core::Error::NotFound(msg)) => return Self::not_found(msg),
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            errors: None,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
