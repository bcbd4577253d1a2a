//! Score submission error types.

use crate::game::Score;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Scores come from `75 - calls` with at least one call, so valid
    /// values are `0..75`.
    #[error("Invalid score: {0} (must be between 0 and 74)")]
    InvalidScore(Score),
}

impl ScoreError {
    /// Client-safe message with database details removed.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            Self::InvalidScore(_) => self.to_string(),
        }
    }
}

pub type ScoreResult<T> = Result<T, ScoreError>;
