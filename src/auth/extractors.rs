use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::warn;

use super::session::{SessionStore, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Pulls the session token from `Authorization: Bearer`, falling back to the session cookie.
pub fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Authenticated user id; rejects with 401 when no session resolves.
pub struct SessionUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    Arc<SessionStore>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<SessionStore>::from_ref(state);
        let Some(token) = session_token(parts) else {
            warn!(path = %parts.uri.path(), "missing session");
            return Err(AppError::Unauthorized);
        };
        match sessions.resolve(&token) {
            Some(user_id) => Ok(SessionUser(user_id)),
            None => {
                warn!(path = %parts.uri.path(), "unknown session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Session lookup that never rejects; for endpoints with a permissive default.
pub struct MaybeSession {
    pub token: Option<String>,
    pub user_id: Option<i64>,
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    Arc<SessionStore>: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<SessionStore>::from_ref(state);
        let token = session_token(parts);
        let user_id = token.as_deref().and_then(|t| sessions.resolve(t));
        Ok(MaybeSession { token, user_id })
    }
}
