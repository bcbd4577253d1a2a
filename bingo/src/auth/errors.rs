//! Failures from registration, login and token checks.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed")]
    HashingFailed,

    /// Unknown username or wrong password. The two are not distinguished.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Empty after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Signature or expiry check failed.
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// The token's session was revoked
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session expired")]
    SessionExpired,
}

impl AuthError {
    /// Text safe to show a client. Storage and token internals are
    /// replaced with generic wording.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::HashingFailed => "Internal server error".to_string(),
            Self::JwtError(_) | Self::SessionNotFound | Self::SessionExpired => {
                "Authentication failed".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the error means the caller simply isn't logged in.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::JwtError(_) | Self::SessionNotFound | Self::SessionExpired
        )
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
