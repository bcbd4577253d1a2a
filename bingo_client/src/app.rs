//! The game host: one [`GameSession`], its random source and the score
//! service, driven by parsed [`Command`]s.

use bingo::{CallStatus, Cell, ClaimOutcome, GameSession, MarkStatus, Randomness, ScoreService};
use log::{info, warn};
use std::sync::Arc;

use crate::{
    commands::{COMMANDS_HELP, Command},
    render::{render_card, render_leaderboard, render_status},
};

/// What the loop should print, and whether to keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct App {
    session: GameSession,
    rng: Randomness,
    service: Arc<dyn ScoreService>,
}

impl App {
    #[must_use]
    pub fn new(service: Arc<dyn ScoreService>, rng: Randomness) -> Self {
        Self {
            session: GameSession::new(),
            rng,
            service,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    /// Deal a fresh card, discarding any game in progress.
    pub fn start_game(&mut self) -> String {
        self.session.new_game(&mut self.rng);
        format!(
            "New game started!\n{}",
            render_card(&self.session.snapshot())
        )
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::NewGame => Reply::say(self.start_game()),
            Command::Call => Reply::say(self.call()),
            Command::Mark(cell) => Reply::say(self.mark(cell)),
            Command::Bingo => Reply::say(self.claim().await),
            Command::Card => Reply::say(render_card(&self.session.snapshot())),
            Command::Status => Reply::say(render_status(&self.session.snapshot())),
            Command::Leaderboard => Reply::say(match self.service.top_scores().await {
                Ok(entries) => render_leaderboard(&entries),
                Err(err) => format!("Could not load the leaderboard: {err}"),
            }),
            Command::WhoAmI => Reply::say(match self.service.current_user().await {
                Ok(Some(username)) => format!("Logged in as {username}"),
                Ok(None) => "Not logged in.".to_string(),
                Err(err) => format!("Could not check login: {err}"),
            }),
            Command::Logout => Reply::say(match self.service.logout().await {
                Ok(()) => "Logged out. Wins from now on are not saved.".to_string(),
                Err(err) => format!("Logged out locally, but the server said: {err}"),
            }),
            Command::Help => Reply::say(COMMANDS_HELP),
            Command::Quit => Reply {
                text: "Goodbye!".to_string(),
                quit: true,
            },
        }
    }

    fn call(&mut self) -> String {
        let outcome = self.session.call_next(&mut self.rng);
        match outcome.status {
            CallStatus::Called => {
                let on_card = outcome
                    .number
                    .zip(self.session.card())
                    .is_some_and(|(number, card)| card.contains(number.into()));
                if on_card {
                    format!("{outcome} (on your card)")
                } else {
                    outcome.to_string()
                }
            }
            _ => outcome.to_string(),
        }
    }

    fn mark(&mut self, cell: Cell) -> String {
        let status = self.session.mark_cell(cell);
        let mut text = status.to_string();
        if matches!(status, MarkStatus::Marked(_)) {
            text.push('\n');
            text.push_str(&render_card(&self.session.snapshot()));
        }
        text
    }

    /// Confirm the claim and, on a win, report the score. The game ends as
    /// won whether or not the score reaches the service.
    async fn claim(&mut self) -> String {
        let outcome = self.session.confirm_win();
        let ClaimOutcome::Bingo { score, .. } = outcome else {
            return outcome.to_string();
        };

        let saved = match self.service.submit_score(score).await {
            Ok(()) => {
                info!("score {score} submitted");
                "Score submitted!".to_string()
            }
            Err(err) => {
                warn!("score {score} not submitted: {err}");
                format!("score not saved: {err}")
            }
        };
        format!("{outcome}\n{saved}\nType 'new' to play again.")
    }
}
