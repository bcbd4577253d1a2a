//! Account API handlers.
//!
//! Register:
//! ```bash
//! curl -X POST http://localhost:5000/api/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass1234"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:5000/api/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass1234"}'
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use bingo::auth::{AuthError, LoginRequest, RegisterRequest};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, MessageResponse, api_error, json_body, middleware::bearer_token};
use crate::logging::log_security_event;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub username: Option<String>,
}

/// Status code for an auth failure.
fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingField(_)
        | AuthError::InvalidUsername(_)
        | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::UsernameTaken => StatusCode::CONFLICT,
        AuthError::InvalidCredentials
        | AuthError::JwtError(_)
        | AuthError::SessionNotFound
        | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::Database(_) | AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn auth_error(error: &AuthError) -> ApiError {
    let status = status_for(error);
    if status.is_server_error() {
        tracing::error!("auth request failed: {error}");
    }
    api_error(status, error.client_message())
}

/// Create an account. Does not log in.
///
/// # Response
///
/// `201 Created` with `{"message": "User registered successfully"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, or missing or invalid username or
///   password
/// - `409 Conflict`: Username already exists
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request = json_body(payload)?;

    match state.auth_manager.register(request).await {
        Ok(user) => {
            tracing::info!(username = %user.username, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("User registered successfully")),
            ))
        }
        Err(e) => Err(auth_error(&e)),
    }
}

/// Authenticate a user and open a session.
///
/// # Response
///
/// `200 OK` with `{"message", "token", "username"}`. Send the token as
/// `Authorization: Bearer <token>` on protected endpoints.
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, or missing username or password
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(payload)?;
    let attempted = request.username.clone();

    match state.auth_manager.login(request).await {
        Ok((user, session)) => Ok(Json(LoginResponse {
            message: "Login successful".to_string(),
            token: session.token,
            username: user.username,
        })),
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                log_security_event("failed_login", Some(&attempted), "Invalid credentials");
            }
            Err(auth_error(&e))
        }
    }
}

/// Revoke the caller's session. Always succeeds for the caller; missing or
/// stale tokens are ignored.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state
            .auth_manager
            .logout(token)
            .await
            .map_err(|e| auth_error(&e))?;
    }
    Ok(Json(MessageResponse::new("Logout successful")))
}

/// Username behind the bearer token, or `null`.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let Some(token) = bearer_token(&headers) else {
        return Ok(Json(MeResponse { username: None }));
    };

    let user = state
        .auth_manager
        .current_user(token)
        .await
        .map_err(|e| auth_error(&e))?;
    Ok(Json(MeResponse {
        username: user.map(|u| u.username),
    }))
}
