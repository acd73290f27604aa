//! Admin sign-in endpoints.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::auth::{bearer_token, Session};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/session - Sign in and receive a bearer token.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Session> {
    let session = state
        .sessions
        .sign_in(&request.email, &request.password)
        .await?;
    success(session)
}

/// GET /api/session - The session behind the bearer token.
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Session> {
    let token = bearer_token(&headers).ok_or_else(|| unauthorized("Missing bearer token"))?;
    match state.sessions.session(&token).await {
        Some(session) => success(session),
        None => Err(unauthorized("Invalid or expired session")),
    }
}

/// DELETE /api/session - Sign out. Unknown tokens are ignored.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.sign_out(&token).await;
    }
    success(())
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized {
        message: message.to_string(),
        kind: None,
    }
}
