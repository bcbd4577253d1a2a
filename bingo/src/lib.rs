//! # Bingo
//!
//! A single-player 75-ball Bingo engine plus the account and leaderboard
//! service that games report to.
//!
//! ## Architecture
//!
//! A game moves through four phases:
//!
//! - **NotStarted**: no card dealt yet
//! - **Active**: card dealt; numbers are called and marked
//! - **Won**: the player claimed a completed line and the claim held
//! - **Exhausted**: all 75 numbers were called without a confirmed win
//!
//! The engine is synchronous and deterministic given its random source.
//! Scores flow out to a [`ScoreService`], which is async and fallible.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, calls, marks, win detection and the session state machine
//! - [`service`]: The score collaborator interface and its embedded implementation
//! - [`auth`], [`scores`], [`db`]: Accounts, stored scores and the SQLite pool
//!
//! ## Example
//!
//! ```
//! use bingo::{GameSession, SeededRandom, CallStatus};
//!
//! let mut rng = SeededRandom::new(7);
//! let mut session = GameSession::new();
//! session.new_game(&mut rng);
//!
//! let outcome = session.call_next(&mut rng);
//! assert_eq!(outcome.status, CallStatus::Called);
//! ```

/// Account registration, login and sessions.
pub mod auth;

/// SQLite connection pool and migrations.
pub mod db;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    CallOutcome, CallStatus, Card, CardError, Cell, ClaimOutcome, Column, EntropyRandom,
    GameSession, GameSnapshot, MarkStatus, Number, Phase, RandomSource, Randomness, Score,
    SeededRandom, SessionError, constants, entities, functional,
};

/// Stored scores and the leaderboard.
pub mod scores;
pub use scores::LeaderboardEntry;

pub mod service;
pub use service::{LocalService, ScoreService, ServiceError, ServiceResult};
