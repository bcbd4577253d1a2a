//! Account registration, login and session management.
//!
//! Passwords are hashed with Argon2id plus a server-side pepper. A successful
//! login creates a session row and returns a JWT that names it, so deleting
//! the row (logout) revokes the token before it expires.
//!
//! ## Example
//!
//! ```no_run
//! use bingo::auth::{AuthManager, LoginRequest, RegisterRequest};
//! use bingo::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::in_memory().await?;
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     auth.register(RegisterRequest {
//!         username: "player1".to_string(),
//!         password: "SecurePass123".to_string(),
//!     })
//!     .await?;
//!
//!     let (user, session) = auth
//!         .login(LoginRequest {
//!             username: "player1".to_string(),
//!             password: "SecurePass123".to_string(),
//!         })
//!         .await?;
//!     println!("{} logged in until {}", user.username, session.expires_at);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{Claims, LoginRequest, RegisterRequest, SessionToken, User, UserId};
