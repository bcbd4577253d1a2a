//! Bingo session state machine.
//!
//! A [`GameSession`] is a plain, serializable value owned by whoever hosts a
//! player's connection. Every action takes the session by reference and, when
//! it needs randomness, a caller-supplied [`RandomSource`]. Actions never
//! fail: each returns a status describing what happened.
//!
//! ```text
//! NotStarted --new_game--> Active --confirm_win--> Won
//!                            |
//!                            +--call_next (all 75 called)--> Exhausted
//! Won | Exhausted --new_game--> Active
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use thiserror::Error;

use super::{
    entities::{CalledNumbers, Card, Cell, MarkedCells, Number, Score},
    functional::{completed_pattern, draw_number, generate_card, score_for_calls},
    random::RandomSource,
};

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Phase {
    #[default]
    NotStarted,
    Active,
    Won,
    Exhausted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NotStarted => "not started",
            Self::Active => "in progress",
            Self::Won => "won",
            Self::Exhausted => "exhausted",
        };
        write!(f, "{repr}")
    }
}

/// What a call attempt did.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CallStatus {
    Called,
    /// Every number has been called. The session is now exhausted.
    Exhausted,
    NotStarted,
    /// The game was already won.
    GameOver,
}

/// Result of [`GameSession::call_next`]. `number` is set only when a number
/// was actually drawn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CallOutcome {
    pub number: Option<Number>,
    pub status: CallStatus,
}

impl CallOutcome {
    const fn rejected(status: CallStatus) -> Self {
        Self {
            number: None,
            status,
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.number) {
            (CallStatus::Called, Some(number)) => write!(f, "Number called: {number}"),
            (CallStatus::Called, None) => write!(f, "Number called"),
            (CallStatus::Exhausted, _) => write!(f, "All numbers have been called! No winner."),
            (CallStatus::NotStarted, _) => write!(f, "Please start a new game first."),
            (CallStatus::GameOver, _) => write!(f, "The game is over. Start a new game."),
        }
    }
}

/// What a mark attempt did.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MarkStatus {
    Marked(Cell),
    AlreadyMarked(Cell),
    NotYetCalled(Cell),
    /// The value is not on this card.
    InvalidCell(Cell),
    /// No game in progress.
    Inactive,
}

impl fmt::Display for MarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marked(cell) => write!(f, "Number {cell} marked!"),
            Self::AlreadyMarked(Cell::Free) => write!(f, "The FREE space is always marked!"),
            Self::AlreadyMarked(cell) => write!(f, "Number {cell} is already marked."),
            Self::NotYetCalled(cell) => write!(f, "Number {cell} hasn't been called yet."),
            Self::InvalidCell(cell) => write!(f, "{cell} is not on your card."),
            Self::Inactive => write!(f, "No game in progress."),
        }
    }
}

/// Result of a player's bingo claim.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ClaimOutcome {
    /// The claim held. The session is now won and `score` should be
    /// submitted to the leaderboard.
    Bingo { score: Score, calls: usize },
    NotYet,
    Inactive,
}

impl fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bingo { score, calls } => {
                write!(f, "BINGO! You won after {calls} calls. Score: {score}")
            }
            Self::NotYet => write!(f, "Not a Bingo yet. Keep playing!"),
            Self::Inactive => write!(f, "No game in progress."),
        }
    }
}

/// Read-only view of a session for renderers.
#[derive(Clone, Copy, Debug)]
pub struct GameSnapshot<'a> {
    pub card: Option<&'a Card>,
    /// Calls in the order they were made.
    pub called: &'a [Number],
    pub marked: &'a MarkedCells,
    pub current_number: Option<Number>,
    pub phase: Phase,
    pub active: bool,
}

/// Why a stored session cannot be restored.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    #[error("a {0:?} session needs a card")]
    MissingCard(Phase),
    #[error("a game that has not started cannot have calls or marks")]
    ProgressWithoutGame,
    #[error("{0} is marked but not on the card")]
    MarkNotOnCard(Number),
    #[error("{0} is marked but was never called")]
    MarkNotCalled(Number),
    #[error("an exhausted game must have every number called")]
    NotExhausted,
    #[error("a won game must have a completed line")]
    WinWithoutLine,
}

/// Serialized shape of a [`GameSession`], checked before it becomes one.
#[derive(Deserialize)]
struct StoredSession {
    card: Option<Card>,
    called: CalledNumbers,
    marked: MarkedCells,
    phase: Phase,
}

impl TryFrom<StoredSession> for GameSession {
    type Error = SessionError;

    fn try_from(stored: StoredSession) -> Result<Self, Self::Error> {
        let StoredSession {
            card,
            called,
            marked,
            phase,
        } = stored;

        let Some(card_ref) = &card else {
            if phase != Phase::NotStarted {
                return Err(SessionError::MissingCard(phase));
            }
            if !called.is_empty() || marked.numbers().next().is_some() {
                return Err(SessionError::ProgressWithoutGame);
            }
            return Ok(Self::default());
        };

        for number in marked.numbers() {
            if !card_ref.contains(Cell::Number(number)) {
                return Err(SessionError::MarkNotOnCard(number));
            }
            if !called.contains(number) {
                return Err(SessionError::MarkNotCalled(number));
            }
        }
        if phase == Phase::Exhausted && !called.is_exhausted() {
            return Err(SessionError::NotExhausted);
        }
        if phase == Phase::Won && completed_pattern(card_ref, &marked).is_none() {
            return Err(SessionError::WinWithoutLine);
        }

        Ok(Self {
            card,
            called,
            marked,
            phase,
        })
    }
}

/// One player's game: the card, calls so far, marks so far and the phase.
///
/// Deserializing checks the parts against each other, so a restored session
/// obeys the same rules as one built by play.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "StoredSession")]
pub struct GameSession {
    card: Option<Card>,
    called: CalledNumbers,
    marked: MarkedCells,
    phase: Phase,
}

impl GameSession {
    /// A session with no game yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any previous game and deal a fresh card. Always succeeds.
    pub fn new_game<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> &Card {
        let previous = self.phase;
        self.called = CalledNumbers::new();
        self.marked = MarkedCells::new();
        self.phase = Phase::Active;
        debug!("new game started (previous phase: {previous})");
        self.card.insert(generate_card(rng))
    }

    /// Start a game on a specific card. Used for replays and tests.
    pub fn start_with_card(&mut self, card: Card) {
        self.card = Some(card);
        self.called = CalledNumbers::new();
        self.marked = MarkedCells::new();
        self.phase = Phase::Active;
    }

    /// Draw the next number.
    pub fn call_next<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> CallOutcome {
        match self.phase {
            Phase::Active => {}
            Phase::NotStarted => return CallOutcome::rejected(CallStatus::NotStarted),
            Phase::Won => return CallOutcome::rejected(CallStatus::GameOver),
            Phase::Exhausted => return CallOutcome::rejected(CallStatus::Exhausted),
        }

        match draw_number(&self.called, rng) {
            Some(number) => {
                self.called.push(number);
                debug!("called {number} ({} so far)", self.called.len());
                CallOutcome {
                    number: Some(number),
                    status: CallStatus::Called,
                }
            }
            None => {
                self.phase = Phase::Exhausted;
                info!("all numbers called without a confirmed bingo");
                CallOutcome::rejected(CallStatus::Exhausted)
            }
        }
    }

    /// Mark a cell the player believes has been called.
    pub fn mark_cell(&mut self, cell: Cell) -> MarkStatus {
        if self.phase != Phase::Active {
            return MarkStatus::Inactive;
        }
        let Some(card) = &self.card else {
            return MarkStatus::Inactive;
        };

        let number = match cell {
            Cell::Free => return MarkStatus::AlreadyMarked(cell),
            Cell::Number(number) => number,
        };
        if !card.contains(cell) {
            return MarkStatus::InvalidCell(cell);
        }
        if self.marked.contains(cell) {
            return MarkStatus::AlreadyMarked(cell);
        }
        if !self.called.contains(number) {
            return MarkStatus::NotYetCalled(cell);
        }

        self.marked.insert(cell);
        debug!("marked {number}");
        MarkStatus::Marked(cell)
    }

    /// Whether the current marks complete any winning line. Pure; callable
    /// in any phase.
    #[must_use]
    pub fn check_win(&self) -> bool {
        self.card
            .as_ref()
            .is_some_and(|card| completed_pattern(card, &self.marked).is_some())
    }

    /// The player's bingo claim. Confirms the win and ends the game when
    /// [`check_win`](Self::check_win) holds; otherwise the game continues.
    pub fn confirm_win(&mut self) -> ClaimOutcome {
        if self.phase != Phase::Active {
            return ClaimOutcome::Inactive;
        }
        if !self.check_win() {
            return ClaimOutcome::NotYet;
        }

        let calls = self.called.len();
        let score = score_for_calls(calls);
        self.phase = Phase::Won;
        info!("bingo confirmed after {calls} calls, score {score}");
        ClaimOutcome::Bingo { score, calls }
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot<'_> {
        GameSnapshot {
            card: self.card.as_ref(),
            called: self.called.as_slice(),
            marked: &self.marked,
            current_number: self.called.last(),
            phase: self.phase,
            active: self.is_active(),
        }
    }

    #[must_use]
    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    #[must_use]
    pub fn called(&self) -> &CalledNumbers {
        &self.called
    }

    #[must_use]
    pub fn marked(&self) -> &MarkedCells {
        &self.marked
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{constants::MAX_NUMBER, random::SeededRandom};

    /// Replays a fixed list of picks, indexing into the remaining numbers.
    struct ScriptedRandom(std::collections::VecDeque<u32>);

    impl RandomSource for ScriptedRandom {
        fn uniform_int(&mut self, min: u32, _max: u32) -> u32 {
            self.0.pop_front().unwrap_or(min)
        }
    }

    fn fixed_card() -> Card {
        Card::from_columns([
            [1, 2, 3, 4, 5],
            [16, 17, 18, 19, 20],
            [31, 32, 33, 34, 35],
            [46, 47, 48, 49, 50],
            [61, 62, 63, 64, 65],
        ])
        .unwrap()
    }

    #[test]
    fn test_new_session_is_not_started() {
        let session = GameSession::new();
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(!session.is_active());
        assert!(session.card().is_none());
        assert!(!session.check_win());
    }

    #[test]
    fn test_actions_before_new_game_are_rejected() {
        let mut session = GameSession::new();
        let mut rng = SeededRandom::new(1);

        let outcome = session.call_next(&mut rng);
        assert_eq!(outcome.status, CallStatus::NotStarted);
        assert_eq!(outcome.number, None);
        assert_eq!(session.mark_cell(Cell::Number(1)), MarkStatus::Inactive);
        assert_eq!(session.confirm_win(), ClaimOutcome::Inactive);
        assert!(session.called().is_empty());
    }

    #[test]
    fn test_new_game_marks_free_once() {
        let mut session = GameSession::new();
        session.new_game(&mut SeededRandom::new(5));
        assert!(session.is_active());
        assert!(session.marked().contains(Cell::Free));
        assert_eq!(session.marked().len(), 1);
        assert!(session.called().is_empty());
    }

    #[test]
    fn test_call_next_records_number() {
        let mut session = GameSession::new();
        let mut rng = SeededRandom::new(8);
        session.new_game(&mut rng);

        let outcome = session.call_next(&mut rng);
        assert_eq!(outcome.status, CallStatus::Called);
        let number = outcome.number.unwrap();
        assert!((1..=MAX_NUMBER).contains(&number));
        assert_eq!(session.called().as_slice(), &[number]);
        assert_eq!(session.snapshot().current_number, Some(number));
    }

    #[test]
    fn test_mark_statuses() {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        // First remaining number is 1.
        let mut rng = ScriptedRandom([0].into());
        assert_eq!(session.call_next(&mut rng).number, Some(1));

        assert_eq!(session.mark_cell(Cell::Free), MarkStatus::AlreadyMarked(Cell::Free));
        assert_eq!(session.mark_cell(Cell::Number(2)), MarkStatus::NotYetCalled(Cell::Number(2)));
        assert_eq!(session.mark_cell(Cell::Number(70)), MarkStatus::InvalidCell(Cell::Number(70)));
        assert_eq!(session.mark_cell(Cell::Number(0)), MarkStatus::InvalidCell(Cell::Number(0)));
        assert_eq!(session.mark_cell(Cell::Number(33)), MarkStatus::InvalidCell(Cell::Number(33)));
        assert_eq!(session.mark_cell(Cell::Number(1)), MarkStatus::Marked(Cell::Number(1)));
        assert_eq!(session.mark_cell(Cell::Number(1)), MarkStatus::AlreadyMarked(Cell::Number(1)));
        assert_eq!(session.marked().len(), 2);
    }

    #[test]
    fn test_claim_without_line_keeps_playing() {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        assert_eq!(session.confirm_win(), ClaimOutcome::NotYet);
        assert!(session.is_active());
    }

    #[test]
    fn test_exhaustion_happens_on_the_call_after_the_last_number() {
        let mut session = GameSession::new();
        let mut rng = SeededRandom::new(21);
        session.new_game(&mut rng);

        for _ in 0..MAX_NUMBER {
            assert_eq!(session.call_next(&mut rng).status, CallStatus::Called);
        }
        assert!(session.called().is_exhausted());
        assert!(session.is_active());

        let outcome = session.call_next(&mut rng);
        assert_eq!(outcome, CallOutcome::rejected(CallStatus::Exhausted));
        assert_eq!(session.phase(), Phase::Exhausted);
        assert_eq!(session.call_next(&mut rng).status, CallStatus::Exhausted);
        assert_eq!(session.mark_cell(Cell::Number(1)), MarkStatus::Inactive);
    }

    #[test]
    fn test_bingo_after_last_call_scores_zero() {
        let mut session = GameSession::new();
        let mut rng = SeededRandom::new(3);
        session.start_with_card(fixed_card());
        for _ in 0..MAX_NUMBER {
            session.call_next(&mut rng);
        }
        for n in [1, 2, 3, 4, 5] {
            assert_eq!(session.mark_cell(Cell::Number(n)), MarkStatus::Marked(Cell::Number(n)));
        }
        assert_eq!(
            session.confirm_win(),
            ClaimOutcome::Bingo {
                score: 0,
                calls: 75
            }
        );
    }

    #[test]
    fn test_new_game_resets_after_win() {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        let mut rng = ScriptedRandom([0, 0, 0, 0, 0].into());
        for _ in 0..5 {
            session.call_next(&mut rng);
        }
        for n in 1..=5 {
            session.mark_cell(Cell::Number(n));
        }
        assert!(matches!(session.confirm_win(), ClaimOutcome::Bingo { score: 70, .. }));
        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(session.call_next(&mut rng).status, CallStatus::GameOver);
        assert_eq!(session.confirm_win(), ClaimOutcome::Inactive);

        session.new_game(&mut SeededRandom::new(2));
        assert!(session.is_active());
        assert!(session.called().is_empty());
        assert_eq!(session.marked().len(), 1);
    }

    #[test]
    fn test_session_serde_roundtrip_preserves_state() {
        let mut session = GameSession::new();
        let mut rng = SeededRandom::new(17);
        session.new_game(&mut rng);
        for _ in 0..10 {
            session.call_next(&mut rng);
        }
        let json = serde_json::to_string(&session).unwrap();
        let restored: GameSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
        assert_eq!(restored.snapshot().called, session.snapshot().called);
    }

    fn restore(json: &serde_json::Value) -> Result<GameSession, serde_json::Error> {
        serde_json::from_value(json.clone())
    }

    fn stored_on_fixed_card() -> serde_json::Value {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        serde_json::to_value(&session).unwrap()
    }

    #[test]
    fn test_restore_rejects_uncalled_marks() {
        let mut json = stored_on_fixed_card();
        json["marked"] = serde_json::json!([
            {"Number": 1}, {"Number": 2}, {"Number": 3}, {"Number": 4}, {"Number": 5}, "Free"
        ]);

        let err = restore(&json).unwrap_err();
        assert!(err.to_string().contains("never called"), "{err}");
    }

    #[test]
    fn test_restore_rejects_marks_off_the_card() {
        let mut json = stored_on_fixed_card();
        json["called"] = serde_json::json!([70]);
        json["marked"] = serde_json::json!([{"Number": 70}, "Free"]);

        let err = restore(&json).unwrap_err();
        assert!(err.to_string().contains("not on the card"), "{err}");
    }

    #[test]
    fn test_restore_rejects_phase_without_card() {
        let mut json = stored_on_fixed_card();
        json["card"] = serde_json::Value::Null;
        assert!(restore(&json).is_err());

        json["phase"] = serde_json::json!("NotStarted");
        json["called"] = serde_json::json!([7]);
        assert!(restore(&json).is_err());
    }

    #[test]
    fn test_restore_rejects_early_exhaustion_and_hollow_win() {
        let mut json = stored_on_fixed_card();
        json["called"] = serde_json::json!([1, 2]);
        json["phase"] = serde_json::json!("Exhausted");
        assert!(restore(&json).is_err());

        json["phase"] = serde_json::json!("Won");
        json["marked"] = serde_json::json!([{"Number": 1}, {"Number": 2}, "Free"]);
        assert!(restore(&json).is_err());
    }

    #[test]
    fn test_restored_session_cannot_overpay() {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        let mut rng = ScriptedRandom(std::collections::VecDeque::new());
        // With an exhausted script every draw takes the lowest remaining
        // number, so B column 1..=5 comes first.
        for _ in 0..5 {
            session.call_next(&mut rng);
        }
        for n in 1..=5 {
            session.mark_cell(Cell::Number(n));
        }

        let mut restored = restore(&serde_json::to_value(&session).unwrap()).unwrap();
        assert_eq!(
            restored.confirm_win(),
            ClaimOutcome::Bingo { score: 70, calls: 5 }
        );
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            CallOutcome {
                number: Some(42),
                status: CallStatus::Called
            }
            .to_string(),
            "Number called: 42"
        );
        assert_eq!(
            MarkStatus::NotYetCalled(Cell::Number(7)).to_string(),
            "Number 7 hasn't been called yet."
        );
        assert_eq!(ClaimOutcome::NotYet.to_string(), "Not a Bingo yet. Keep playing!");
        assert_eq!(Phase::Exhausted.to_string(), "exhausted");
    }
}
