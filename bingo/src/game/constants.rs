//! Fixed dimensions of a bingo game.

/// Cells per row and per column.
pub const GRID_SIZE: usize = 5;

/// Cells on a card.
pub const CARD_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Values available to each column (B, I, N, G, O).
pub const COLUMN_SPAN: u8 = 15;

/// Highest number that can be called. Numbers run from 1 to this value.
pub const MAX_NUMBER: u8 = COLUMN_SPAN * GRID_SIZE as u8;

/// Column and row of the FREE cell.
pub const FREE_COLUMN: usize = 2;
pub const FREE_ROW: usize = 2;

/// Flattened index of the FREE cell.
pub const FREE_INDEX: usize = FREE_COLUMN * GRID_SIZE + FREE_ROW;

/// Column letters, in card order.
pub const COLUMN_LETTERS: [char; GRID_SIZE] = ['B', 'I', 'N', 'G', 'O'];

/// Top scores shown on the leaderboard unless configured otherwise.
pub const DEFAULT_LEADERBOARD_SIZE: u32 = 10;
