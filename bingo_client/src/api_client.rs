//! HTTP client for the bingo score server.

use async_trait::async_trait;
use bingo::{LeaderboardEntry, Score, ScoreService, ServiceError, ServiceResult};
use log::{debug, warn};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`ScoreService`] backed by a remote `bingo_server`.
///
/// The bearer token from the last successful login is kept in memory and
/// attached to protected requests.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    token: Mutex<Option<String>>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScorePayload {
    score: Score,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            token: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
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

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn send(request: RequestBuilder) -> ServiceResult<Response> {
    request
        .send()
        .await
        .map_err(|err| ServiceError::Transport(err.to_string()))
}

async fn decode<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| ServiceError::Transport(format!("unexpected response: {err}")))
}

/// Turn a non-2xx response into a [`ServiceError`], keeping the server's
/// `{"error": ...}` message when there is one.
async fn error_for(response: Response) -> ServiceError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    debug!("server answered {status}: {message}");

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::Unauthorized,
        s if s.is_server_error() => ServiceError::Internal(message),
        _ => ServiceError::Rejected(message),
    }
}

#[async_trait]
impl ScoreService for ApiClient {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<()> {
        let response = send(
            self.client
                .post(self.url("/api/register"))
                .json(&Credentials { username, password }),
        )
        .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_for(response).await)
        }
    }

    async fn login(&self, username: &str, password: &str) -> ServiceResult<String> {
        let response = send(
            self.client
                .post(self.url("/api/login"))
                .json(&Credentials { username, password }),
        )
        .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ServiceError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let body: LoginResponse = decode(response).await?;
        self.set_token(Some(body.token));
        Ok(body.username)
    }

    async fn logout(&self) -> ServiceResult<()> {
        if self.token().is_none() {
            return Ok(());
        }
        let response = send(self.authorized(self.client.post(self.url("/api/logout")))).await;
        // The local session ends even when the server cannot be told.
        self.set_token(None);

        let response = response?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_for(response).await)
        }
    }

    async fn current_user(&self) -> ServiceResult<Option<String>> {
        if self.token().is_none() {
            return Ok(None);
        }
        let response = send(self.authorized(self.client.get(self.url("/api/me")))).await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let body: MeResponse = decode(response).await?;
        if body.username.is_none() {
            self.set_token(None);
        }
        Ok(body.username)
    }

    async fn submit_score(&self, score: Score) -> ServiceResult<()> {
        if self.token().is_none() {
            return Err(ServiceError::Unauthorized);
        }
        let response = send(
            self.authorized(self.client.post(self.url("/api/submit_score")))
                .json(&ScorePayload { score }),
        )
        .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let err = error_for(response).await;
            warn!("score {score} rejected: {err}");
            Err(err)
        }
    }

    async fn top_scores(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let response = send(self.client.get(self.url("/api/leaderboard"))).await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        decode(response).await
    }
}
