use bingo::{Cell, Number};
use std::fmt;

/// A parsed line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    NewGame,
    Call,
    Mark(Cell),
    Bingo,
    Card,
    Status,
    Leaderboard,
    WhoAmI,
    Logout,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing was typed.
    Empty,
    /// `mark` without a value.
    MarkMissingValue,
    /// `mark` followed by something that is neither a number nor `free`.
    InvalidMarkValue(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Type a command, or 'help' to list them"),
            Self::MarkMissingValue => {
                write!(f, "Mark needs a number (e.g., 'mark 42' or 'mark free')")
            }
            Self::InvalidMarkValue(value) => write!(
                f,
                "Invalid mark value '{value}'. Use a number from your card or 'free'"
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Help text listing every command.
pub const COMMANDS_HELP: &str = "\
Commands:
  new               Start a new game with a fresh card
  call              Call the next number
  mark N            Mark number N on your card (a bare number works too)
  mark free         The FREE space (always marked)
  bingo             Claim a win
  card              Show your card
  status            Show the game state and recent calls
  leaderboard       Show the top scores
  whoami            Show who is logged in
  logout            Log out; later wins are not saved
  help              Show this help
  quit              Leave the game";

/// Parse a line of input into a [`Command`]. Matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use bingo::Cell;
/// use bingo_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("call"), Ok(Command::Call));
/// assert_eq!(parse_command("mark 42"), Ok(Command::Mark(Cell::Number(42))));
/// assert_eq!(parse_command("17"), Ok(Command::Mark(Cell::Number(17))));
/// assert_eq!(parse_command("mark free"), Ok(Command::Mark(Cell::Free)));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let lowered = input.trim().to_ascii_lowercase();
    let parts: Vec<&str> = lowered.split_ascii_whitespace().collect();

    match parts.as_slice() {
        [] => Err(ParseError::Empty),
        ["new"] | ["n"] => Ok(Command::NewGame),
        ["call"] | ["c"] => Ok(Command::Call),
        ["bingo"] | ["b"] => Ok(Command::Bingo),
        ["card"] => Ok(Command::Card),
        ["status"] | ["s"] => Ok(Command::Status),
        ["leaderboard"] | ["lb"] => Ok(Command::Leaderboard),
        ["whoami"] => Ok(Command::WhoAmI),
        ["logout"] => Ok(Command::Logout),
        ["help"] | ["h"] | ["?"] => Ok(Command::Help),
        ["quit"] | ["exit"] | ["q"] => Ok(Command::Quit),
        ["mark"] | ["m"] => Err(ParseError::MarkMissingValue),
        ["mark" | "m", value] => parse_mark_value(value).map(Command::Mark),
        [value] if value.bytes().all(|b| b.is_ascii_digit()) => {
            parse_mark_value(value).map(Command::Mark)
        }
        _ => Err(ParseError::UnrecognizedCommand(input.trim().to_string())),
    }
}

/// `free` or a number. Numbers not on the card still parse; the game
/// reports them.
fn parse_mark_value(value: &str) -> Result<Cell, ParseError> {
    if value == "free" {
        return Ok(Cell::Free);
    }
    value
        .parse::<Number>()
        .map(Cell::Number)
        .map_err(|_| ParseError::InvalidMarkValue(value.to_string()))
}
