//! Authentication middleware for protected endpoints.
//!
//! The middleware reads a bearer token from the `Authorization` header,
//! checks it against the session store, and injects the decoded
//! [`Claims`] into request extensions for downstream handlers:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use bingo::auth::Claims;
//!
//! async fn protected_handler(Extension(claims): Extension<Claims>) -> String {
//!     format!("Authenticated as {}", claims.username)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AppState, ErrorResponse};
use crate::logging::log_security_event;

/// Token from an `Authorization: Bearer <token>` header, if present.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests without a live session.
///
/// - **Success**: injects `Claims` into request extensions and calls the next handler
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Invalid, expired or revoked token**: `401 Unauthorized`
/// - **Database failure**: `500 Internal Server Error`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return unauthorized();
    };

    match state.auth_manager.authenticate(token).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) if e.is_unauthenticated() => {
            log_security_event("rejected_token", None, &e.to_string());
            unauthorized()
        }
        Err(e) => {
            tracing::error!("session lookup failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.client_message())),
            )
                .into_response()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Unauthorized")),
    )
        .into_response()
}
