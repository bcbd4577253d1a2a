//! HTTP service for bingo accounts, score submission and the leaderboard.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so the router can be exercised in tests without a socket.

pub mod api;
pub mod config;
pub mod logging;
