//! Score and leaderboard models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{auth::UserId, game::Score};

/// Name shown for scores whose account no longer exists.
pub const UNKNOWN_USER: &str = "Unknown User";

/// A stored score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub user_id: UserId,
    pub score: Score,
    pub created_at: DateTime<Utc>,
}

/// One leaderboard row, as delivered to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: Score,
}
