//! Settings for `bingo_server`, read once at startup.
//!
//! CLI flags win over environment variables, which win over defaults. The
//! signing secret and password pepper have no default.

use bingo::{
    auth::manager::DEFAULT_SESSION_HOURS,
    constants::DEFAULT_LEADERBOARD_SIZE,
    db::{DatabaseConfig, config::DEFAULT_DATABASE_URL},
};
use std::net::SocketAddr;

/// Used when neither `--bind` nor `SERVER_BIND` is given.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

const MIN_JWT_SECRET_LEN: usize = 32;
const MIN_PEPPER_LEN: usize = 16;
const MAX_LEADERBOARD_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    /// Rows returned by `GET /api/leaderboard`.
    pub leaderboard_size: u32,
    pub session_hours: i64,
}

/// Secrets. Never logged.
#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub password_pepper: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Build the configuration from CLI overrides and the environment, then
    /// [`validate`](Self::validate) it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingRequired`] when `JWT_SECRET` or
    /// `PASSWORD_PEPPER` is unset, [`ConfigError::Invalid`] for anything
    /// unparseable or out of range.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => {
                let raw = std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                raw.parse()
                    .map_err(|_| ConfigError::invalid("SERVER_BIND", format!("'{raw}' is not IP:PORT")))?
            }
        };

        let database = DatabaseConfig {
            database_url: database_url_override
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 5),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 1),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 10),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
        };

        let security = SecurityConfig {
            jwt_secret: required("JWT_SECRET", "openssl rand -hex 32")?,
            password_pepper: required("PASSWORD_PEPPER", "openssl rand -hex 16")?,
        };

        let config = Self {
            bind,
            database,
            security,
            leaderboard_size: parse_env_or("LEADERBOARD_SIZE", DEFAULT_LEADERBOARD_SIZE),
            session_hours: parse_env_or("SESSION_HOURS", DEFAULT_SESSION_HOURS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks on an assembled configuration.
    ///
    /// # Errors
    ///
    /// The first offending setting, as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!("needs {MIN_JWT_SECRET_LEN} or more characters"),
            ));
        }
        if self.security.password_pepper.len() < MIN_PEPPER_LEN {
            return Err(ConfigError::invalid(
                "PASSWORD_PEPPER",
                format!("needs {MIN_PEPPER_LEN} or more characters"),
            ));
        }
        if !(1..=MAX_LEADERBOARD_SIZE).contains(&self.leaderboard_size) {
            return Err(ConfigError::invalid(
                "LEADERBOARD_SIZE",
                format!("{} is outside 1..={MAX_LEADERBOARD_SIZE}", self.leaderboard_size),
            ));
        }
        if self.session_hours <= 0 {
            return Err(ConfigError::invalid("SESSION_HOURS", "must be positive"));
        }
        let db = &self.database;
        if db.max_connections == 0 || db.min_connections > db.max_connections {
            return Err(ConfigError::invalid(
                "DB_MAX_CONNECTIONS",
                format!(
                    "{} is zero or below DB_MIN_CONNECTIONS ({})",
                    db.max_connections, db.min_connections
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set (generate one with: {hint})")]
    MissingRequired { var: String, hint: String },

    #[error("{var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ConfigError {
    fn invalid(var: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.to_string(),
            reason: reason.into(),
        }
    }
}

fn required(var: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingRequired {
        var: var.to_string(),
        hint: hint.to_string(),
    })
}

/// The parsed variable, or `default` when unset or unparseable.
fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
