//! Score persistence and the leaderboard.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ScoreError, ScoreResult};
pub use manager::ScoreManager;
pub use models::{LeaderboardEntry, ScoreRecord, UNKNOWN_USER};
