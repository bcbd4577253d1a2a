//! Pure game functions: card generation, drawing, win detection and scoring.

use super::{
    constants::{CARD_CELLS, COLUMN_SPAN, FREE_INDEX, GRID_SIZE, MAX_NUMBER},
    entities::{CalledNumbers, Card, Cell, Column, MarkedCells, Number, Score},
    random::{RandomSource, shuffle},
};

/// The twelve winning lines as flattened card indices: five rows, five
/// columns, then the two diagonals.
pub const WINNING_PATTERNS: [[usize; GRID_SIZE]; 12] = [
    [0, 1, 2, 3, 4],
    [5, 6, 7, 8, 9],
    [10, 11, 12, 13, 14],
    [15, 16, 17, 18, 19],
    [20, 21, 22, 23, 24],
    [0, 5, 10, 15, 20],
    [1, 6, 11, 16, 21],
    [2, 7, 12, 17, 22],
    [3, 8, 13, 18, 23],
    [4, 9, 14, 19, 24],
    [0, 6, 12, 18, 24],
    [4, 8, 12, 16, 20],
];

/// Deal a new card. Each column takes the first five values of a shuffled
/// copy of its range; the center of column N is then replaced by FREE.
pub fn generate_card<R: RandomSource + ?Sized>(rng: &mut R) -> Card {
    let mut cells = [Cell::Free; CARD_CELLS];
    for column in Column::ALL {
        let mut pool: [Number; COLUMN_SPAN as usize] = [0; COLUMN_SPAN as usize];
        for (slot, value) in pool.iter_mut().zip(column.range()) {
            *slot = value;
        }
        shuffle(&mut pool, rng);
        for (row, &value) in pool.iter().take(GRID_SIZE).enumerate() {
            cells[column.index() * GRID_SIZE + row] = Cell::Number(value);
        }
    }
    cells[FREE_INDEX] = Cell::Free;
    Card::from_valid_cells(cells)
}

/// Pick a number uniformly from those not yet called. `None` when all 75
/// have been called.
pub fn draw_number<R: RandomSource + ?Sized>(called: &CalledNumbers, rng: &mut R) -> Option<Number> {
    let remaining = called.remaining_count();
    if remaining == 0 {
        return None;
    }
    let pick = rng.uniform_int(0, remaining as u32 - 1) as usize;
    called.remaining().nth(pick)
}

/// Index into [`WINNING_PATTERNS`] of the first line whose cells are all
/// marked.
#[must_use]
pub fn completed_pattern(card: &Card, marked: &MarkedCells) -> Option<usize> {
    WINNING_PATTERNS.iter().position(|pattern| {
        pattern
            .iter()
            .all(|&idx| card.cell(idx).is_some_and(|cell| marked.contains(cell)))
    })
}

#[must_use]
pub fn has_bingo(card: &Card, marked: &MarkedCells) -> bool {
    completed_pattern(card, marked).is_some()
}

/// Score for a bingo confirmed after `calls` numbers have been drawn.
#[must_use]
pub fn score_for_calls(calls: usize) -> Score {
    Score::from(MAX_NUMBER).saturating_sub(calls as Score)
}
