//! Request Handlers
//!
//! Account registration, login, and read-only queries. The session store
//! maps opaque tokens to usernames for the WebSocket upgrade; sessions live
//! only as long as the process, like everything else here.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::errors::AuthError;
use crate::games::FlipEngine;
use axum::{extract::State, http::StatusCode, Extension, Json};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pub engine: Arc<FlipEngine>,
    pub sessions: DashMap<String, String>,
    pub version: String,
}

impl AppState {
    pub fn new(engine: Arc<FlipEngine>) -> Self {
        Self {
            engine,
            sessions: DashMap::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Issue a fresh session token bound to `username`.
    pub fn issue_session(&self, username: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), username.to_string());
        token
    }

    /// The identity behind a token, if any.
    pub fn session_user(&self, token: &str) -> Option<String> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    /// Revoke a token. Returns whether it was live.
    pub fn revoke_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }
}

/// Health check handler
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
    })
}

/// Create an account and issue a session token.
/// POST /register
pub async fn register_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request(
            request_id.0,
            "username and password are required".to_string(),
        ));
    }

    state
        .engine
        .register_user(&request.username, &request.password)
        .map_err(|err| match err {
            AuthError::UsernameTaken => ApiError::conflict(request_id.0.clone(), err.to_string()),
            AuthError::InvalidCredentials => {
                ApiError::unauthorized(request_id.0.clone(), err.to_string())
            }
        })?;

    let token = state.issue_session(&request.username);
    Ok(Json(AuthResponse {
        token,
        username: request.username,
    }))
}

/// Verify credentials and issue a session token.
/// POST /login
pub async fn login_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    state
        .engine
        .login(&request.username, &request.password)
        .map_err(|err| ApiError::unauthorized(request_id.0.clone(), err.to_string()))?;

    let token = state.issue_session(&request.username);
    Ok(Json(AuthResponse {
        token,
        username: request.username,
    }))
}

/// End the session behind a token. Idempotent; revoking an unknown or
/// already-revoked token is not an error.
/// POST /logout
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> StatusCode {
    state.revoke_session(&request.token);
    StatusCode::NO_CONTENT
}

/// Waiting-game list, REST view of the `game_list_update` payload.
/// GET /games
pub async fn games_handler(State(state): State<Arc<AppState>>) -> Json<GamesResponse> {
    let games = state.engine.waiting_games();
    let count = games.len();
    Json(GamesResponse { games, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::notify::Notifier;

    fn state() -> Arc<AppState> {
        let engine = Arc::new(FlipEngine::new(GameConfig::default(), Notifier::new(16)));
        Arc::new(AppState::new(engine))
    }

    #[test]
    fn sessions_round_trip() {
        let state = state();
        let token = state.issue_session("alice");
        assert_eq!(state.session_user(&token), Some("alice".to_string()));
        assert_eq!(state.session_user("bogus"), None);
    }

    #[tokio::test]
    async fn register_rejects_blank_credentials() {
        let state = state();
        let result = register_handler(
            Extension(RequestId("req-1".to_string())),
            State(state),
            Json(RegisterRequest {
                username: "  ".to_string(),
                email: None,
                password: "pw".to_string(),
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let state = state();
        let token = state.issue_session("alice");
        assert!(state.session_user(&token).is_some());

        let status = logout_handler(
            State(state.clone()),
            Json(LogoutRequest {
                token: token.clone(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.session_user(&token), None);

        // Revoking again is harmless.
        let status = logout_handler(State(state), Json(LogoutRequest { token })).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = state();
        let response = register_handler(
            Extension(RequestId("req-1".to_string())),
            State(state.clone()),
            Json(RegisterRequest {
                username: "alice".to_string(),
                email: Some("alice@example.com".to_string()),
                password: "hunter2".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.username, "alice");

        let login = login_handler(
            Extension(RequestId("req-2".to_string())),
            State(state.clone()),
            Json(LoginRequest {
                username: "alice".to_string(),
                password: "hunter2".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(state.session_user(&login.0.token), Some("alice".to_string()));

        let bad = login_handler(
            Extension(RequestId("req-3".to_string())),
            State(state),
            Json(LoginRequest {
                username: "alice".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;
        assert!(bad.is_err());
    }
}
