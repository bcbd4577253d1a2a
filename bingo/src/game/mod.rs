//! Bingo game engine: card model, injected randomness and the per-player
//! session state machine.
//!
//! Everything in here is synchronous and free of I/O. Hosts own a
//! [`GameSession`] per player and drive it with a [`RandomSource`].

pub mod constants;
pub mod entities;
pub mod functional;
pub mod random;
pub mod state_machine;

pub use entities::{CalledNumbers, Card, CardError, Cell, Column, MarkedCells, Number, Score};
pub use random::{EntropyRandom, RandomSource, Randomness, SeededRandom};
pub use state_machine::{
    CallOutcome, CallStatus, ClaimOutcome, GameSession, GameSnapshot, MarkStatus, Phase,
    SessionError,
};
