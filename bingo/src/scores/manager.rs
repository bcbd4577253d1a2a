//! Score manager implementation.

use super::{
    errors::{ScoreError, ScoreResult},
    models::{LeaderboardEntry, ScoreRecord, UNKNOWN_USER},
};
use crate::{
    auth::UserId,
    game::{Score, constants::MAX_NUMBER},
};
use chrono::{NaiveDateTime, Utc};
use log::{debug, info};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Records scores and ranks them.
#[derive(Clone)]
pub struct ScoreManager {
    pool: Arc<SqlitePool>,
}

impl ScoreManager {
    #[must_use]
    pub const fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Store a score for a user.
    ///
    /// # Errors
    ///
    /// * `ScoreError::InvalidScore` - Score outside `0..75`
    /// * `ScoreError::Database` - Insert failed
    pub async fn submit_score(&self, user_id: UserId, score: Score) -> ScoreResult<ScoreRecord> {
        if score >= Score::from(MAX_NUMBER) {
            return Err(ScoreError::InvalidScore(score));
        }

        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO scores (user_id, score, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(i64::from(score))
        .bind(now.naive_utc())
        .fetch_one(self.pool.as_ref())
        .await?;

        info!("user {user_id} scored {score}");
        Ok(ScoreRecord {
            id: row.get("id"),
            user_id,
            score,
            created_at: now,
        })
    }

    /// Best scores first; ties go to the earlier submission.
    ///
    /// # Errors
    ///
    /// Returns database failures.
    pub async fn top_scores(&self, limit: u32) -> ScoreResult<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(u.username, ?) AS username, s.score AS score
            FROM scores s
            LEFT JOIN users u ON u.id = s.user_id
            ORDER BY s.score DESC, s.created_at ASC, s.id ASC
            LIMIT ?
            "#,
        )
        .bind(UNKNOWN_USER)
        .bind(i64::from(limit))
        .fetch_all(self.pool.as_ref())
        .await?;

        debug!("leaderboard query returned {} rows", rows.len());
        Ok(rows
            .iter()
            .map(|row| LeaderboardEntry {
                username: row.get("username"),
                score: Score::try_from(row.get::<i64, _>("score")).unwrap_or_default(),
            })
            .collect())
    }

    /// Every score a user has submitted, newest first.
    ///
    /// # Errors
    ///
    /// Returns database failures.
    pub async fn scores_for_user(&self, user_id: UserId) -> ScoreResult<Vec<ScoreRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, score, created_at
            FROM scores
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .iter()
            .map(|row| ScoreRecord {
                id: row.get("id"),
                user_id: row.get("user_id"),
                score: Score::try_from(row.get::<i64, _>("score")).unwrap_or_default(),
                created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
            })
            .collect())
    }
}
