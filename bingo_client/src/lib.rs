//! Internal modules for the bingo client.
//!
//! This library provides command parsing, the HTTP score service client,
//! rendering and the game loop used by the `bingo_client` binary.

pub mod api_client;
pub mod app;
pub mod commands;
pub mod render;
