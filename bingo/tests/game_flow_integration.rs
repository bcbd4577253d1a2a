//! Integration tests for complete game flows through `GameSession`.
//!
//! A scripted random source lets each test decide exactly which numbers are
//! called and in what order.

use bingo::game::{
    CallStatus, Card, Cell, ClaimOutcome, GameSession, MarkStatus, Phase, RandomSource,
    SeededRandom, constants::MAX_NUMBER,
};
use std::collections::{BTreeSet, VecDeque};

/// Replays picks that make `call_next` produce a chosen sequence.
struct ScriptedCalls {
    picks: VecDeque<u32>,
}

impl ScriptedCalls {
    /// Convert wanted numbers into indices over the ascending remaining set.
    fn new(numbers: &[u8]) -> Self {
        let mut called = BTreeSet::new();
        let mut picks = VecDeque::new();
        for &n in numbers {
            let index = (1..n).filter(|v| !called.contains(v)).count();
            picks.push_back(index as u32);
            called.insert(n);
        }
        Self { picks }
    }
}

impl RandomSource for ScriptedCalls {
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        self.picks.pop_front().unwrap_or(min).clamp(min, max)
    }
}

/// Card with B=1..5, I=16..20, N=31,32,FREE,34,35, G=46..50, O=61..65.
fn fixed_card() -> Card {
    Card::from_columns([
        [1, 2, 3, 4, 5],
        [16, 17, 18, 19, 20],
        [31, 32, 33, 34, 35],
        [46, 47, 48, 49, 50],
        [61, 62, 63, 64, 65],
    ])
    .expect("legal card")
}

fn started(card: Card) -> GameSession {
    let mut session = GameSession::new();
    session.start_with_card(card);
    session
}

#[test]
fn test_fresh_game_has_no_win() {
    let mut session = GameSession::new();
    session.new_game(&mut SeededRandom::new(99));
    assert!(!session.check_win());
    assert_eq!(session.confirm_win(), ClaimOutcome::NotYet);
}

#[test]
fn test_diagonal_win_then_calls_rejected() {
    let mut session = started(fixed_card());
    // Main diagonal: B row 0, I row 1, FREE, G row 3, O row 4.
    let diagonal = [1, 17, 49, 65];
    let mut rng = ScriptedCalls::new(&[70, 1, 17, 49, 65]);

    for _ in 0..5 {
        assert_eq!(session.call_next(&mut rng).status, CallStatus::Called);
    }
    assert_eq!(session.called().as_slice(), &[70, 1, 17, 49, 65]);

    for (i, &n) in diagonal.iter().enumerate() {
        assert!(!session.check_win(), "win before mark {i}");
        assert_eq!(session.mark_cell(Cell::Number(n)), MarkStatus::Marked(Cell::Number(n)));
    }
    assert!(session.check_win());
    assert_eq!(
        session.confirm_win(),
        ClaimOutcome::Bingo {
            score: 70,
            calls: 5
        }
    );
    assert_eq!(session.phase(), Phase::Won);

    let outcome = session.call_next(&mut SeededRandom::new(0));
    assert_eq!(outcome.status, CallStatus::GameOver);
    assert_eq!(outcome.number, None);
    assert_eq!(session.called().len(), 5);
    assert_eq!(session.mark_cell(Cell::Number(2)), MarkStatus::Inactive);
    // Still a winning board; checking stays pure.
    assert!(session.check_win());
}

#[test]
fn test_row_needs_all_five() {
    let mut session = started(fixed_card());
    // Pattern {0,5,10,15,20}: row 0 across every column.
    let mut rng = ScriptedCalls::new(&[1, 16, 31, 46, 61]);
    for _ in 0..5 {
        session.call_next(&mut rng);
    }
    for n in [1, 16, 31, 46] {
        session.mark_cell(Cell::Number(n));
    }
    assert!(!session.check_win());
    assert_eq!(session.confirm_win(), ClaimOutcome::NotYet);
    assert!(session.is_active());

    session.mark_cell(Cell::Number(61));
    assert!(session.check_win());
}

#[test]
fn test_idempotent_marking() {
    let mut session = started(fixed_card());
    let mut rng = ScriptedCalls::new(&[18]);
    session.call_next(&mut rng);

    assert_eq!(session.mark_cell(Cell::Number(18)), MarkStatus::Marked(Cell::Number(18)));
    let before = session.clone();
    assert_eq!(
        session.mark_cell(Cell::Number(18)),
        MarkStatus::AlreadyMarked(Cell::Number(18))
    );
    assert_eq!(session, before);
}

#[test]
fn test_exhaustion_scenario() {
    let mut session = started(fixed_card());
    let mut rng = SeededRandom::new(5);

    for _ in 0..MAX_NUMBER {
        assert_eq!(session.call_next(&mut rng).status, CallStatus::Called);
    }
    let all: BTreeSet<u8> = session.called().iter().collect();
    assert_eq!(all, (1..=MAX_NUMBER).collect::<BTreeSet<u8>>());

    let outcome = session.call_next(&mut rng);
    assert_eq!(outcome.status, CallStatus::Exhausted);
    assert_eq!(outcome.number, None);
    assert_eq!(session.phase(), Phase::Exhausted);
    assert!(!session.check_win());
    assert_eq!(session.call_next(&mut rng).status, CallStatus::Exhausted);
    assert_eq!(session.confirm_win(), ClaimOutcome::Inactive);
}

#[test]
fn test_snapshot_tracks_state() {
    let mut session = GameSession::new();
    let snapshot = session.snapshot();
    assert!(snapshot.card.is_none());
    assert!(!snapshot.active);
    assert_eq!(snapshot.phase, Phase::NotStarted);

    session.start_with_card(fixed_card());
    let mut rng = ScriptedCalls::new(&[3, 40]);
    session.call_next(&mut rng);
    session.call_next(&mut rng);
    session.mark_cell(Cell::Number(3));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.card, Some(&fixed_card()));
    assert_eq!(snapshot.called, &[3, 40]);
    assert_eq!(snapshot.current_number, Some(40));
    assert!(snapshot.marked.contains(Cell::Number(3)));
    assert!(snapshot.marked.contains(Cell::Free));
    assert!(snapshot.active);
    assert_eq!(snapshot.phase, Phase::Active);
}

#[test]
fn test_new_game_discards_previous_state() {
    let mut rng = SeededRandom::new(12);
    let mut session = GameSession::new();
    let first = session.new_game(&mut rng).clone();
    for _ in 0..MAX_NUMBER + 1 {
        session.call_next(&mut rng);
    }
    assert_eq!(session.phase(), Phase::Exhausted);

    let second = session.new_game(&mut rng).clone();
    assert_ne!(first, second);
    assert_eq!(session.phase(), Phase::Active);
    assert!(session.called().is_empty());
    assert_eq!(session.marked().len(), 1);
}
