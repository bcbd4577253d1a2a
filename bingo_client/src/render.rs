//! Plain-text views of a game and the leaderboard.

use bingo::{
    GameSnapshot, LeaderboardEntry,
    constants::{COLUMN_LETTERS, GRID_SIZE, MAX_NUMBER},
    entities::MarkedCells,
};
use std::fmt::Write;

const CELL_WIDTH: usize = 6;
const RECENT_CALLS: usize = 5;

/// The card as a 5x5 grid under a `B I N G O` header. Marked cells are
/// bracketed.
#[must_use]
pub fn render_card(snapshot: &GameSnapshot<'_>) -> String {
    let Some(card) = snapshot.card else {
        return "No card yet. Type 'new' to start a game.".to_string();
    };

    let mut out = String::new();
    for letter in COLUMN_LETTERS {
        let _ = write!(out, "{letter:^CELL_WIDTH$}");
    }
    for row in 0..GRID_SIZE {
        out.push('\n');
        let Some(cells) = card.row(row) else { continue };
        for cell in cells {
            let _ = write!(out, "{:^CELL_WIDTH$}", cell_label(cell, snapshot.marked));
        }
    }
    out
}

fn cell_label(cell: bingo::Cell, marked: &MarkedCells) -> String {
    if marked.contains(cell) {
        format!("[{cell}]")
    } else {
        cell.to_string()
    }
}

/// Phase, current number, call count and the most recent calls.
#[must_use]
pub fn render_status(snapshot: &GameSnapshot<'_>) -> String {
    let mut out = format!("Game: {}", snapshot.phase);
    if let Some(number) = snapshot.current_number {
        let _ = write!(out, "\nCurrent number: {number}");
    }
    let _ = write!(
        out,
        "\nNumbers called: {}/{MAX_NUMBER}",
        snapshot.called.len()
    );

    let recent: Vec<String> = snapshot
        .called
        .iter()
        .rev()
        .take(RECENT_CALLS)
        .map(ToString::to_string)
        .collect();
    if !recent.is_empty() {
        let _ = write!(out, "\nRecent calls: {}", recent.join(", "));
    }
    out
}

/// Rank, username and score per line, or `No scores yet.` when empty.
#[must_use]
pub fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No scores yet.".to_string();
    }

    let width = entries
        .iter()
        .map(|entry| entry.username.len())
        .max()
        .unwrap_or(0)
        .max("Player".len());

    let mut out = format!("{:<4} {:<width$} {:>5}", "Rank", "Player", "Score");
    for (rank, entry) in entries.iter().enumerate() {
        let _ = write!(
            out,
            "\n{:<4} {:<width$} {:>5}",
            rank + 1,
            entry.username,
            entry.score
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bingo::{Card, GameSession, Phase};

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
    fn test_render_card_without_game() {
        let session = GameSession::new();
        assert!(render_card(&session.snapshot()).contains("new"));
    }

    #[test]
    fn test_render_card_grid() {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        let text = render_card(&session.snapshot());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0].split_whitespace().collect::<String>(), "BINGO");
        assert_eq!(
            lines[1].split_whitespace().collect::<Vec<_>>(),
            vec!["1", "16", "31", "46", "61"]
        );
        // FREE is marked from the start.
        assert!(lines[3].contains("[FREE]"));
        assert!(!lines[1].contains('['));
    }

    #[test]
    fn test_render_status_lists_recent_calls_newest_first() {
        let mut session = GameSession::new();
        session.start_with_card(fixed_card());
        let mut rng = bingo::SeededRandom::new(3);
        for _ in 0..7 {
            session.call_next(&mut rng);
        }
        let snapshot = session.snapshot();
        let text = render_status(&snapshot);

        assert_eq!(snapshot.phase, Phase::Active);
        assert!(text.contains("Game: in progress"));
        assert!(text.contains("Numbers called: 7/75"));
        let newest = snapshot.called[6];
        assert!(text.contains(&format!("Current number: {newest}")));
        assert!(text.contains(&format!("Recent calls: {newest},")));
    }

    #[test]
    fn test_render_empty_leaderboard() {
        assert_eq!(render_leaderboard(&[]), "No scores yet.");
    }

    #[test]
    fn test_render_leaderboard_ranks() {
        let entries = vec![
            LeaderboardEntry {
                username: "alice".to_string(),
                score: 61,
            },
            LeaderboardEntry {
                username: "bob".to_string(),
                score: 55,
            },
        ];
        let text = render_leaderboard(&entries);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1].split_whitespace().collect::<Vec<_>>(),
            vec!["1", "alice", "61"]
        );
        assert_eq!(
            lines[2].split_whitespace().collect::<Vec<_>>(),
            vec!["2", "bob", "55"]
        );
    }
}
