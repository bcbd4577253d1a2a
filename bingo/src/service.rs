//! The score collaborator: accounts, score submission and the leaderboard,
//! as seen by a game host.
//!
//! A [`ScoreService`] is stateful in the way a browser session is: a
//! successful `login` remembers the session, `submit_score` and
//! `current_user` act on it, and `logout` forgets it. [`LocalService`] is the
//! embedded implementation backed by SQLite; the terminal client also ships
//! an HTTP implementation.

use async_trait::async_trait;
use log::warn;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::{
    auth::{AuthError, AuthManager, LoginRequest, RegisterRequest},
    db::{Database, DatabaseConfig},
    game::{Score, constants::DEFAULT_LEADERBOARD_SIZE},
    scores::{LeaderboardEntry, ScoreError, ScoreManager},
};

/// Collaborator failures, normalized across implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("could not reach the score service: {0}")]
    Transport(String),

    /// No live login for this action.
    #[error("not logged in")]
    Unauthorized,

    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request was understood and refused.
    #[error("{0}")]
    Rejected(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthenticated() {
            return Self::Unauthorized;
        }
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Database(_) | AuthError::HashingFailed => {
                Self::Internal(err.client_message())
            }
            _ => Self::Rejected(err.client_message()),
        }
    }
}

impl From<ScoreError> for ServiceError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::InvalidScore(_) => Self::Rejected(err.client_message()),
            ScoreError::Database(_) => Self::Internal(err.client_message()),
        }
    }
}

/// Accounts, score submission and ranking.
#[async_trait]
pub trait ScoreService: Send + Sync {
    /// Create an account. Does not log in.
    async fn register(&self, username: &str, password: &str) -> ServiceResult<()>;

    /// Log in and remember the session. Returns the canonical username.
    async fn login(&self, username: &str, password: &str) -> ServiceResult<String>;

    /// Forget the current session. Logging out while logged out is fine.
    async fn logout(&self) -> ServiceResult<()>;

    /// Username of the current session, if any.
    async fn current_user(&self) -> ServiceResult<Option<String>>;

    /// Record a score for the logged-in user.
    async fn submit_score(&self, score: Score) -> ServiceResult<()>;

    /// Leaderboard, best first, as delivered by the service.
    async fn top_scores(&self) -> ServiceResult<Vec<LeaderboardEntry>>;
}

/// Embedded collaborator over a local SQLite database.
pub struct LocalService {
    auth: AuthManager,
    scores: ScoreManager,
    leaderboard_size: u32,
    token: Mutex<Option<String>>,
}

impl LocalService {
    /// Build on an already-migrated database.
    #[must_use]
    pub fn new(db: &Database, pepper: String, jwt_secret: String) -> Self {
        let pool = Arc::new(db.pool().clone());
        Self {
            auth: AuthManager::new(Arc::clone(&pool), pepper, jwt_secret),
            scores: ScoreManager::new(pool),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            token: Mutex::new(None),
        }
    }

    /// Open (creating if needed) and migrate the database, then build on it.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the database cannot be opened or
    /// migrated.
    pub async fn open(
        config: &DatabaseConfig,
        pepper: String,
        jwt_secret: String,
    ) -> ServiceResult<Self> {
        let db = Database::new(config)
            .await
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        db.migrate()
            .await
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        Ok(Self::new(&db, pepper, jwt_secret))
    }

    #[must_use]
    pub const fn with_leaderboard_size(mut self, size: u32) -> Self {
        self.leaderboard_size = size;
        self
    }

    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

#[async_trait]
impl ScoreService for LocalService {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<()> {
        self.auth
            .register(RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> ServiceResult<String> {
        let (user, session) = self
            .auth
            .login(LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.set_token(Some(session.token));
        Ok(user.username)
    }

    async fn logout(&self) -> ServiceResult<()> {
        if let Some(token) = self.token() {
            self.auth.logout(&token).await?;
        }
        self.set_token(None);
        Ok(())
    }

    async fn current_user(&self) -> ServiceResult<Option<String>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        let user = self.auth.current_user(&token).await?;
        if user.is_none() {
            self.set_token(None);
        }
        Ok(user.map(|user| user.username))
    }

    async fn submit_score(&self, score: Score) -> ServiceResult<()> {
        let token = self.token().ok_or(ServiceError::Unauthorized)?;
        let claims = self.auth.authenticate(&token).await.inspect_err(|err| {
            warn!("score submission with stale session: {err}");
        })?;
        self.scores.submit_score(claims.sub, score).await?;
        Ok(())
    }

    async fn top_scores(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        Ok(self.scores.top_scores(self.leaderboard_size).await?)
    }
}
