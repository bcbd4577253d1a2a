//! Auto-play a seeded game: call, mark whatever lands on the card, and claim
//! as soon as a line completes.
//!
//! ```text
//! cargo run -p bingo --example seeded_game -- 42
//! ```

use bingo::{CallStatus, Cell, ClaimOutcome, GameSession, SeededRandom};

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    let mut rng = SeededRandom::new(seed);
    let mut session = GameSession::new();
    println!("Seed {seed}\n{}\n", session.new_game(&mut rng));

    loop {
        let outcome = session.call_next(&mut rng);
        if outcome.status != CallStatus::Called {
            println!("{outcome}");
            break;
        }
        let Some(number) = outcome.number else { break };
        if session.card().is_some_and(|card| card.contains(Cell::Number(number))) {
            println!("{outcome} -> {}", session.mark_cell(Cell::Number(number)));
        }

        if session.check_win() {
            if let ClaimOutcome::Bingo { score, calls } = session.confirm_win() {
                println!("\nLine after {calls} calls, score {score}");
            }
            break;
        }
    }
}
