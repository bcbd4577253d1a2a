//! Score submission and leaderboard handlers.

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
    http::StatusCode,
};
use bingo::{Score, auth::Claims, scores::{LeaderboardEntry, ScoreError}};
use serde::Deserialize;

use super::{ApiError, AppState, MessageResponse, api_error, json_body, request_id::RequestId};

/// Score body. The score is signed so negative values reach validation
/// instead of failing to decode.
#[derive(Debug, Default, Deserialize)]
pub struct ScorePayload {
    pub score: Option<i64>,
}

/// Record a score for the authenticated user.
///
/// # Request Body
///
/// ```json
/// { "score": 58 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, missing score, or not in `0..75`
/// - `401 Unauthorized`: Missing, invalid or revoked token (from middleware)
pub async fn submit_score(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ScorePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Some(raw) = json_body(payload)?.score else {
        return Err(api_error(StatusCode::BAD_REQUEST, "score is required"));
    };
    let Ok(score) = Score::try_from(raw) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid score: {raw} (must be between 0 and 74)"),
        ));
    };

    match state.score_manager.submit_score(claims.sub, score).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Score submitted successfully")),
        )),
        Err(e @ ScoreError::InvalidScore(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.client_message()))
        }
        Err(e) => {
            tracing::error!(request_id = request_id.as_str(), "score insert failed: {e}");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.client_message()))
        }
    }
}

/// Top scores, best first.
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    state
        .score_manager
        .top_scores(state.leaderboard_size)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("leaderboard query failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.client_message())
        })
}
