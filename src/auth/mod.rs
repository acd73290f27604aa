//! Admin session handling.
//!
//! Sign-in goes through a [`SessionProvider`]. The local provider checks
//! credentials against the `admins` table and hands out opaque bearer
//! tokens; `/api/admin/*` is guarded by [`require_session`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::sync::{watch, Mutex, RwLock};

use crate::db::{normalize_email, AccountRepository};
use crate::errors::{AppError, AuthError, AuthErrorKind};

static EMAIL_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub identifier: String,
    pub signed_in_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Authentication service gating the admin panel.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self, token: &str);

    /// The live session behind a bearer token, if any.
    async fn session(&self, token: &str) -> Option<Session>;

    /// Receiver that holds the current session and sees every later
    /// sign-in or sign-out.
    fn on_session_change(&self) -> watch::Receiver<Option<Session>>;
}

/// Failed sign-ins against one identifier within the current window.
#[derive(Debug, Clone, Copy)]
struct FailedAttempts {
    count: u32,
    first_at: DateTime<Utc>,
}

/// Session provider backed by the local admin account table.
pub struct LocalSessionProvider {
    accounts: AccountRepository,
    ttl: Duration,
    max_attempts: u32,
    lockout: Duration,
    sessions: RwLock<HashMap<String, Session>>,
    failures: Mutex<HashMap<String, FailedAttempts>>,
    changes: watch::Sender<Option<Session>>,
}

fn duration_from_secs(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

impl LocalSessionProvider {
    pub fn new(
        accounts: AccountRepository,
        ttl_secs: u64,
        max_attempts: u32,
        lockout_secs: u64,
    ) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            accounts,
            ttl: duration_from_secs(ttl_secs),
            max_attempts,
            lockout: duration_from_secs(lockout_secs),
            sessions: RwLock::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            changes,
        }
    }

    fn window_elapsed(&self, attempts: &FailedAttempts, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(attempts.first_at) >= self.lockout
    }

    async fn check_credentials(&self, identifier: &str, secret: &str) -> Result<(), AuthErrorKind> {
        if !EMAIL_FORMAT.is_match(identifier) {
            return Err(AuthErrorKind::InvalidCredentialFormat);
        }

        {
            let mut failures = self.failures.lock().await;
            if let Some(attempts) = failures.get(identifier).copied() {
                if self.window_elapsed(&attempts, Utc::now()) {
                    failures.remove(identifier);
                } else if attempts.count >= self.max_attempts {
                    return Err(AuthErrorKind::RateLimited);
                }
            }
        }

        let account = self.accounts.find(identifier).await.map_err(|e| {
            tracing::error!("Account lookup failed: {}", e);
            AuthErrorKind::Unknown("auth/internal-error".to_string())
        })?;

        // Unknown identifiers are not tracked, only real accounts can be locked.
        let Some(account) = account else {
            return Err(AuthErrorKind::UnknownAccount);
        };
        if account.disabled {
            return Err(AuthErrorKind::AccountDisabled);
        }
        if !account.verify(secret) {
            self.record_failure(identifier).await;
            return Err(AuthErrorKind::WrongSecret);
        }
        Ok(())
    }

    async fn record_failure(&self, identifier: &str) {
        let now = Utc::now();
        let mut failures = self.failures.lock().await;
        failures.retain(|_, attempts| !self.window_elapsed(attempts, now));
        failures
            .entry(identifier.to_string())
            .or_insert(FailedAttempts {
                count: 0,
                first_at: now,
            })
            .count += 1;
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let identifier = normalize_email(identifier);

        if let Err(kind) = self.check_credentials(&identifier, secret).await {
            tracing::warn!(identifier = %identifier, code = kind.code(), "Sign-in rejected");
            return Err(AuthError::new(kind));
        }
        self.failures.lock().await.remove(&identifier);

        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().simple().to_string(),
            identifier,
            signed_in_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, s| !s.is_expired(now));
            if sessions.len() < before {
                tracing::debug!(swept = before - sessions.len(), "Dropped expired sessions");
            }
            sessions.insert(session.token.clone(), session.clone());
        }
        self.changes.send_replace(Some(session.clone()));

        tracing::info!(identifier = %session.identifier, "Admin signed in");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) {
        let Some(session) = self.sessions.write().await.remove(token) else {
            return;
        };
        self.changes.send_replace(None);
        tracing::info!(identifier = %session.identifier, "Admin signed out");
    }

    async fn session(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if !session.is_expired(Utc::now()) {
            return Some(session);
        }

        self.sessions.write().await.remove(token);
        tracing::debug!(identifier = %session.identifier, "Session expired");
        None
    }

    fn on_session_change(&self) -> watch::Receiver<Option<Session>> {
        self.changes.subscribe()
    }
}

/// Owned view of the current session for one consumer.
///
/// `init` subscribes to the provider and `teardown` unsubscribes; there is
/// no global session state.
pub struct SessionContext {
    receiver: Option<watch::Receiver<Option<Session>>>,
}

impl SessionContext {
    pub fn init(provider: &dyn SessionProvider) -> Self {
        Self {
            receiver: Some(provider.on_session_change()),
        }
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<Session> {
        self.receiver.as_ref().and_then(|rx| rx.borrow().clone())
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Wait for the next sign-in or sign-out. Returns `None` once torn down
    /// or when the provider is gone.
    pub async fn changed(&mut self) -> Option<Option<Session>> {
        let rx = self.receiver.as_mut()?;
        rx.changed().await.ok()?;
        Some(rx.borrow_and_update().clone())
    }

    pub fn teardown(&mut self) {
        self.receiver = None;
    }
}

/// Bearer-token guard for admin routes. The validated [`Session`] is put in
/// the request extensions.
pub async fn require_session(
    provider: Arc<dyn SessionProvider>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return unauthorized("Missing bearer token");
    };

    match provider.session(&token).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => unauthorized("Invalid or expired session"),
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn unauthorized(message: &str) -> Response {
    AppError::Unauthorized {
        message: message.to_string(),
        kind: None,
    }
    .into_response()
}
