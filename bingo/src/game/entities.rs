use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{
    collections::BTreeSet,
    fmt::{self},
    ops::RangeInclusive,
};
use thiserror::Error;

use super::constants::{CARD_CELLS, COLUMN_LETTERS, COLUMN_SPAN, FREE_INDEX, GRID_SIZE, MAX_NUMBER};

/// A callable number, 1 through 75.
pub type Number = u8;

/// Points awarded for a confirmed bingo. Fewer calls means more points.
pub type Score = u32;

/// A single square on a card: either a number or the FREE center.
///
/// Called and marked values use this same type, so a marked number and the
/// card cell holding it always compare equal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Cell {
    Number(Number),
    Free,
}

impl Cell {
    #[must_use]
    pub const fn number(self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(n),
            Self::Free => None,
        }
    }

    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl From<Number> for Cell {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.pad(&n.to_string()),
            Self::Free => f.pad("FREE"),
        }
    }
}

/// The five card columns. Each owns a disjoint run of 15 numbers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Column {
    B,
    I,
    N,
    G,
    O,
}

impl Column {
    pub const ALL: [Self; GRID_SIZE] = [Self::B, Self::I, Self::N, Self::G, Self::O];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Numbers that may appear in this column.
    #[must_use]
    pub fn range(self) -> RangeInclusive<Number> {
        let low = self.index() as Number * COLUMN_SPAN + 1;
        low..=low + COLUMN_SPAN - 1
    }

    /// Column a number belongs to, if it is callable at all.
    #[must_use]
    pub fn of(number: Number) -> Option<Self> {
        if !(1..=MAX_NUMBER).contains(&number) {
            return None;
        }
        Self::ALL
            .get(usize::from((number - 1) / COLUMN_SPAN))
            .copied()
    }

    #[must_use]
    pub const fn letter(self) -> char {
        COLUMN_LETTERS[self.index()]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Reasons a set of cells is not a valid card.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum CardError {
    #[error("{value} does not belong in column {column}")]
    OutOfRange { column: Column, value: Number },
    #[error("{value} appears more than once in column {column}")]
    Duplicate { column: Column, value: Number },
    #[error("the center cell must be FREE")]
    MissingFree,
    #[error("FREE may only occupy the center cell")]
    MisplacedFree,
}

/// A 5x5 bingo card stored column-major: cells 0..5 are column B top to
/// bottom, cells 5..10 are column I, and so on. Index 12 is FREE.
///
/// A `Card` can only be built through validating constructors, so every
/// instance satisfies the column-range, uniqueness and FREE-center rules.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Card {
    cells: [Cell; CARD_CELLS],
}

impl Card {
    /// Build a card from flattened column-major cells.
    ///
    /// # Errors
    ///
    /// Returns a [`CardError`] naming the first rule the cells break.
    pub fn from_cells(cells: [Cell; CARD_CELLS]) -> Result<Self, CardError> {
        for column in Column::ALL {
            let mut seen = 0u128;
            for row in 0..GRID_SIZE {
                let idx = column.index() * GRID_SIZE + row;
                match (idx == FREE_INDEX, cells[idx]) {
                    (true, Cell::Free) => {}
                    (true, Cell::Number(_)) => return Err(CardError::MissingFree),
                    (false, Cell::Free) => return Err(CardError::MisplacedFree),
                    (false, Cell::Number(value)) => {
                        if !column.range().contains(&value) {
                            return Err(CardError::OutOfRange { column, value });
                        }
                        let bit = 1u128 << value;
                        if seen & bit != 0 {
                            return Err(CardError::Duplicate { column, value });
                        }
                        seen |= bit;
                    }
                }
            }
        }
        Ok(Self { cells })
    }

    /// Build a card from five columns of five numbers each. The value given
    /// for the center of column N is discarded in favor of FREE.
    ///
    /// # Errors
    ///
    /// Returns a [`CardError`] if any column breaks its range or repeats a
    /// value.
    pub fn from_columns(columns: [[Number; GRID_SIZE]; GRID_SIZE]) -> Result<Self, CardError> {
        let mut cells = [Cell::Free; CARD_CELLS];
        for (c, column) in columns.iter().enumerate() {
            for (r, &value) in column.iter().enumerate() {
                let idx = c * GRID_SIZE + r;
                if idx != FREE_INDEX {
                    cells[idx] = Cell::Number(value);
                }
            }
        }
        Self::from_cells(cells)
    }

    /// Wrap cells already known to satisfy every card rule.
    pub(super) fn from_valid_cells(cells: [Cell; CARD_CELLS]) -> Self {
        debug_assert!(Self::from_cells(cells).is_ok());
        Self { cells }
    }

    #[must_use]
    pub const fn cells(&self) -> &[Cell; CARD_CELLS] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    #[must_use]
    pub fn at(&self, column: Column, row: usize) -> Option<Cell> {
        if row >= GRID_SIZE {
            return None;
        }
        self.cell(column.index() * GRID_SIZE + row)
    }

    #[must_use]
    pub fn column(&self, column: Column) -> &[Cell] {
        let start = column.index() * GRID_SIZE;
        &self.cells[start..start + GRID_SIZE]
    }

    /// Cells of one row, left (B) to right (O).
    #[must_use]
    pub fn row(&self, row: usize) -> Option<[Cell; GRID_SIZE]> {
        if row >= GRID_SIZE {
            return None;
        }
        Some(Column::ALL.map(|column| self.cells[column.index() * GRID_SIZE + row]))
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn numbers(&self) -> impl Iterator<Item = Number> + '_ {
        self.cells.iter().filter_map(|cell| cell.number())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            cells: [Cell; CARD_CELLS],
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::from_cells(raw.cells).map_err(de::Error::custom)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in COLUMN_LETTERS {
            write!(f, "{letter:>5}")?;
        }
        for row in 0..GRID_SIZE {
            writeln!(f)?;
            for column in Column::ALL {
                write!(f, "{:>5}", self.cells[column.index() * GRID_SIZE + row])?;
            }
        }
        Ok(())
    }
}

/// Numbers drawn so far, in call order, with constant-time membership.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CalledNumbers {
    order: Vec<Number>,
    /// Bit `n` is set once `n` has been called.
    mask: u128,
}

impl CalledNumbers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Vec::with_capacity(usize::from(MAX_NUMBER)),
            mask: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True once every number from 1 to 75 has been called.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.order.len() == usize::from(MAX_NUMBER)
    }

    #[must_use]
    pub fn contains(&self, number: Number) -> bool {
        number <= MAX_NUMBER && self.mask & (1u128 << number) != 0
    }

    /// The most recent call.
    #[must_use]
    pub fn last(&self) -> Option<Number> {
        self.order.last().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Number] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = Number> + '_ {
        self.order.iter().copied()
    }

    /// Numbers not yet called, ascending.
    pub fn remaining(&self) -> impl Iterator<Item = Number> + '_ {
        (1..=MAX_NUMBER).filter(|&n| !self.contains(n))
    }

    #[must_use]
    pub fn remaining_count(&self) -> usize {
        usize::from(MAX_NUMBER) - self.order.len()
    }

    /// Record a call. Returns false, leaving the set untouched, for numbers
    /// outside 1..=75 or already called.
    pub(crate) fn push(&mut self, number: Number) -> bool {
        if !(1..=MAX_NUMBER).contains(&number) || self.contains(number) {
            return false;
        }
        self.mask |= 1u128 << number;
        self.order.push(number);
        true
    }
}

impl Serialize for CalledNumbers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.order.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CalledNumbers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let order = Vec::<Number>::deserialize(deserializer)?;
        let mut called = Self::new();
        for number in order {
            if !called.push(number) {
                return Err(de::Error::custom(format!(
                    "invalid or repeated call: {number}"
                )));
            }
        }
        Ok(called)
    }
}

/// Cells the player has confirmed. FREE is always a member.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "BTreeSet<Cell>")]
pub struct MarkedCells(BTreeSet<Cell>);

impl MarkedCells {
    /// A fresh set holding only FREE.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::from([Cell::Free]))
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.0.contains(&cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marked numbers, ignoring FREE.
    pub fn numbers(&self) -> impl Iterator<Item = Number> + '_ {
        self.0.iter().filter_map(|cell| cell.number())
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().copied()
    }

    pub(crate) fn insert(&mut self, cell: Cell) -> bool {
        self.0.insert(cell)
    }
}

impl Default for MarkedCells {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeSet<Cell>> for MarkedCells {
    fn from(mut value: BTreeSet<Cell>) -> Self {
        value.insert(Cell::Free);
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_columns() -> [[Number; GRID_SIZE]; GRID_SIZE] {
        [
            [1, 2, 3, 4, 5],
            [16, 17, 18, 19, 20],
            [31, 32, 33, 34, 35],
            [46, 47, 48, 49, 50],
            [61, 62, 63, 64, 65],
        ]
    }

    #[test]
    fn test_column_ranges() {
        assert_eq!(Column::B.range(), 1..=15);
        assert_eq!(Column::I.range(), 16..=30);
        assert_eq!(Column::N.range(), 31..=45);
        assert_eq!(Column::G.range(), 46..=60);
        assert_eq!(Column::O.range(), 61..=75);
    }

    #[test]
    fn test_column_of_number() {
        assert_eq!(Column::of(1), Some(Column::B));
        assert_eq!(Column::of(15), Some(Column::B));
        assert_eq!(Column::of(16), Some(Column::I));
        assert_eq!(Column::of(45), Some(Column::N));
        assert_eq!(Column::of(75), Some(Column::O));
        assert_eq!(Column::of(0), None);
        assert_eq!(Column::of(76), None);
    }

    #[test]
    fn test_card_from_columns_places_free_in_center() {
        let card = Card::from_columns(sample_columns()).unwrap();
        assert_eq!(card.cell(FREE_INDEX), Some(Cell::Free));
        assert_eq!(card.at(Column::N, 2), Some(Cell::Free));
        // The discarded center value is not on the card.
        assert!(!card.contains(Cell::Number(33)));
        assert_eq!(card.numbers().count(), 24);
    }

    #[test]
    fn test_card_is_column_major() {
        let card = Card::from_columns(sample_columns()).unwrap();
        assert_eq!(card.cell(0), Some(Cell::Number(1)));
        assert_eq!(card.cell(4), Some(Cell::Number(5)));
        assert_eq!(card.cell(5), Some(Cell::Number(16)));
        assert_eq!(card.cell(24), Some(Cell::Number(65)));
        assert_eq!(
            card.row(0),
            Some([1, 16, 31, 46, 61].map(Cell::Number))
        );
        assert_eq!(card.column(Column::G), &[46, 47, 48, 49, 50].map(Cell::Number));
    }

    #[test]
    fn test_card_rejects_out_of_range_value() {
        let mut columns = sample_columns();
        columns[0][0] = 16;
        assert_eq!(
            Card::from_columns(columns),
            Err(CardError::OutOfRange {
                column: Column::B,
                value: 16
            })
        );
    }

    #[test]
    fn test_card_rejects_duplicate_value() {
        let mut columns = sample_columns();
        columns[4][4] = 61;
        assert_eq!(
            Card::from_columns(columns),
            Err(CardError::Duplicate {
                column: Column::O,
                value: 61
            })
        );
    }

    #[test]
    fn test_card_rejects_misplaced_free() {
        let card = Card::from_columns(sample_columns()).unwrap();
        let mut cells = *card.cells();
        cells[0] = Cell::Free;
        assert_eq!(Card::from_cells(cells), Err(CardError::MisplacedFree));

        let mut cells = *card.cells();
        cells[FREE_INDEX] = Cell::Number(33);
        assert_eq!(Card::from_cells(cells), Err(CardError::MissingFree));
    }

    #[test]
    fn test_card_out_of_bounds_lookups() {
        let card = Card::from_columns(sample_columns()).unwrap();
        assert_eq!(card.cell(25), None);
        assert_eq!(card.at(Column::B, 5), None);
        assert_eq!(card.row(5), None);
    }

    #[test]
    fn test_card_display_has_header() {
        let card = Card::from_columns(sample_columns()).unwrap();
        let repr = card.to_string();
        assert!(repr.starts_with("    B    I    N    G    O"));
        assert!(repr.contains("FREE"));
        assert_eq!(repr.lines().count(), 6);
    }

    #[test]
    fn test_card_deserialize_validates() {
        let card = Card::from_columns(sample_columns()).unwrap();
        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);

        let tampered = json.replacen("{\"Number\":1}", "{\"Number\":70}", 1);
        assert!(serde_json::from_str::<Card>(&tampered).is_err());
    }

    #[test]
    fn test_called_numbers_push() {
        let mut called = CalledNumbers::new();
        assert!(called.push(42));
        assert!(called.push(7));
        assert!(!called.push(42));
        assert!(!called.push(0));
        assert!(!called.push(76));
        assert_eq!(called.as_slice(), &[42, 7]);
        assert_eq!(called.last(), Some(7));
        assert!(called.contains(42));
        assert!(!called.contains(8));
        assert!(!called.contains(200));
        assert_eq!(called.remaining_count(), 73);
    }

    #[test]
    fn test_called_numbers_exhaustion() {
        let mut called = CalledNumbers::new();
        for n in 1..=MAX_NUMBER {
            assert!(called.push(n));
        }
        assert!(called.is_exhausted());
        assert_eq!(called.remaining().count(), 0);
    }

    #[test]
    fn test_called_numbers_deserialize_rejects_duplicates() {
        let called: CalledNumbers = serde_json::from_str("[3, 9, 75]").unwrap();
        assert_eq!(called.as_slice(), &[3, 9, 75]);
        assert!(called.contains(9));

        assert!(serde_json::from_str::<CalledNumbers>("[3, 3]").is_err());
        assert!(serde_json::from_str::<CalledNumbers>("[0]").is_err());
        assert!(serde_json::from_str::<CalledNumbers>("[76]").is_err());
    }

    #[test]
    fn test_marked_cells_always_contain_free() {
        let marked = MarkedCells::new();
        assert!(marked.contains(Cell::Free));
        assert_eq!(marked.numbers().count(), 0);

        let restored: MarkedCells = serde_json::from_str("[{\"Number\":5}]").unwrap();
        assert!(restored.contains(Cell::Free));
        assert!(restored.contains(Cell::Number(5)));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(42).to_string(), "42");
        assert_eq!(Cell::Free.to_string(), "FREE");
        assert_eq!(Cell::from(9), Cell::Number(9));
        assert!(Cell::Free.is_free());
        assert_eq!(Cell::Number(3).number(), Some(3));
    }
}
