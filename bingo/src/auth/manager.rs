//! Accounts and login sessions over SQLite.

use super::{
    errors::{AuthError, AuthResult},
    models::{Claims, LoginRequest, RegisterRequest, SessionToken, User, UserId},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, NaiveDateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{info, warn};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::sync::Arc;
use uuid::Uuid;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 20;
const MIN_PASSWORD_LEN: usize = 8;

/// Default lifetime of a login session.
pub const DEFAULT_SESSION_HOURS: i64 = 24;

/// Registers players, checks their passwords and issues revocable tokens.
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<SqlitePool>,
    pepper: String,
    jwt_secret: String,
    session_duration: Duration,
}

impl AuthManager {
    /// `pepper` is appended to every password before hashing; `jwt_secret`
    /// signs session tokens. Changing either invalidates what exists.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>, pepper: String, jwt_secret: String) -> Self {
        Self {
            pool,
            pepper,
            jwt_secret,
            session_duration: Duration::hours(DEFAULT_SESSION_HOURS),
        }
    }

    /// Override how long a login stays valid.
    #[must_use]
    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingField` - Username or password empty
    /// * `AuthError::InvalidUsername` - Not 3-20 letters, digits or `_`
    /// * `AuthError::WeakPassword` - Password too short
    /// * `AuthError::UsernameTaken` - Someone has the name
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        validate_username(username)?;
        validate_password(&request.password)?;

        let existing = sqlx::query("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hash_password(&request.password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, created_at, last_login
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(Utc::now().naive_utc())
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|err| match err {
            // Lost a race with a concurrent registration.
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UsernameTaken,
            other => AuthError::Database(other),
        })?;

        let user = user_from_row(&row);
        info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, SessionToken)>` - User and signed session token
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingField` - Username or password empty
    /// * `AuthError::InvalidCredentials` - Unknown user or wrong password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionToken)> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let Some(row) = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at, last_login
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?
        else {
            warn!("login attempt for unknown user {username}");
            return Err(AuthError::InvalidCredentials);
        };

        let password_hash: String = row.get("password_hash");
        if self.verify_password(&request.password, &password_hash).is_err() {
            warn!("wrong password for {username}");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let mut user = user_from_row(&row);
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(now.naive_utc())
            .bind(user.id)
            .execute(self.pool.as_ref())
            .await?;
        user.last_login = Some(now);

        let session = self.create_session(&user).await?;
        info!("user {} logged in", user.username);
        Ok((user, session))
    }

    /// Create a session row and sign a token naming it.
    async fn create_session(&self, user: &User) -> AuthResult<SessionToken> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now + self.session_duration;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session_id)
        .bind(user.id)
        .bind(expires_at.naive_utc())
        .bind(now.naive_utc())
        .execute(self.pool.as_ref())
        .await?;

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            sid: session_id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(SessionToken { token, expires_at })
    }

    /// Logout by deleting the token's session.
    ///
    /// Unknown, expired or malformed tokens are ignored, so logging out twice
    /// is fine.
    ///
    /// # Errors
    ///
    /// Only database failures are reported.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let Ok(claims) = self.verify_token(token) else {
            return Ok(());
        };
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(&claims.sid)
            .execute(self.pool.as_ref())
            .await?;
        info!("user {} logged out", claims.username);
        Ok(())
    }

    /// Validate a bearer token against its signature, expiry and session row.
    ///
    /// # Errors
    ///
    /// * `AuthError::JwtError` - Bad signature, malformed or expired token
    /// * `AuthError::SessionNotFound` - Session was revoked
    /// * `AuthError::SessionExpired` - Session row outlived its expiry
    pub async fn authenticate(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.verify_token(token)?;

        let row = sqlx::query("SELECT expires_at FROM sessions WHERE id = ? AND user_id = ?")
            .bind(&claims.sid)
            .bind(claims.sub)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let expires_at = row.get::<NaiveDateTime, _>("expires_at").and_utc();
        if expires_at < Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&claims.sid)
                .execute(self.pool.as_ref())
                .await?;
            return Err(AuthError::SessionExpired);
        }

        Ok(claims)
    }

    /// The user behind a token, or `None` when the token is not a live
    /// session.
    ///
    /// # Errors
    ///
    /// Only database failures are reported.
    pub async fn current_user(&self, token: &str) -> AuthResult<Option<User>> {
        let claims = match self.authenticate(token).await {
            Ok(claims) => claims,
            Err(err) if err.is_unauthenticated() => return Ok(None),
            Err(err) => return Err(err),
        };
        self.find_user(claims.sub).await
    }

    /// Delete every expired session row.
    ///
    /// # Errors
    ///
    /// Returns database failures.
    pub async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now().naive_utc())
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected())
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns database failures.
    pub async fn find_user(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query("SELECT id, username, created_at, last_login FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    /// Decode and check a token's signature and expiry.
    fn verify_token(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Argon2id over password + pepper, PHC string out.
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
        last_login: row
            .get::<Option<NaiveDateTime>, _>("last_login")
            .map(|dt| dt.and_utc()),
    }
}

fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} characters"
        )));
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("player_one_2024").is_ok());
        assert!(matches!(validate_username("ab"), Err(AuthError::InvalidUsername(_))));
        assert!(matches!(
            validate_username("a_very_long_username_indeed"),
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(validate_username("bad name"), Err(AuthError::InvalidUsername(_))));
        assert!(matches!(validate_username("semi;colon"), Err(AuthError::InvalidUsername(_))));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(validate_password("short"), Err(AuthError::WeakPassword(_))));
    }
}
