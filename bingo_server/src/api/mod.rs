//! HTTP API for the bingo score service.
//!
//! JSON in and out. Failures are `{"error": "..."}`, plain acknowledgements
//! are `{"message": "..."}`.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, logout and the current user
//! - [`scores`]: Score submission and the leaderboard
//! - [`middleware`]: Bearer-token authentication for protected endpoints
//! - [`request_id`]: Per-request correlation ids
//!
//! # Endpoints
//!
//! ```text
//! POST /api/register        - Create an account (public)
//! POST /api/login           - Log in, returns a bearer token (public)
//! POST /api/logout          - Revoke the bearer token, if any (public)
//! GET  /api/me              - Current username or null (public)
//! POST /api/submit_score    - Record a score (auth required)
//! GET  /api/leaderboard     - Top scores (public)
//! GET  /health              - Database health
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively so browser front ends on other origins
//! can call the API.

pub mod auth;
pub mod middleware;
pub mod request_id;
pub mod scores;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use bingo::{auth::AuthManager, db::Database, scores::ScoreManager};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub score_manager: Arc<ScoreManager>,
    pub db: Database,
    pub leaderboard_size: u32,
}

impl AppState {
    /// Build managers over a migrated database.
    #[must_use]
    pub fn new(db: Database, auth_manager: AuthManager, leaderboard_size: u32) -> Self {
        let pool = Arc::new(db.pool().clone());
        Self {
            auth_manager: Arc::new(auth_manager),
            score_manager: Arc::new(ScoreManager::new(pool)),
            db,
            leaderboard_size,
        }
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Handler failure: status plus error body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(error)))
}

/// Unwrap a JSON body, turning a missing, malformed or mistyped body into a
/// `400` with the usual error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )),
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use bingo_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/me", get(auth::me))
        .route("/api/leaderboard", get(scores::leaderboard));

    let protected_routes = Router::new()
        .route("/api/submit_score", post(scores::submit_score))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:5000/health
/// # {"status":"healthy","database":true,"version":"0.1.0","timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.db.health_check().await.is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
