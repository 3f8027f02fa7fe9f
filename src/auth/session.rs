use std::{collections::HashMap, sync::RwLock};

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::debug;

pub const SESSION_COOKIE: &str = "bubbles_session";
const TOKEN_LEN: usize = 48;

/// Process-lifetime map from opaque session token to user id. No expiry.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, i64>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a fresh token and binds it to `user_id`.
    pub fn issue(&self, user_id: i64) -> String {
        let token: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.bind(&token, user_id);
        token
    }

    pub fn bind(&self, token: &str, user_id: i64) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(token.to_string(), user_id);
        debug!(user_id, "session bound");
    }

    pub fn resolve(&self, token: &str) -> Option<i64> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.get(token).copied()
    }

    /// Removing an unknown token is not an error.
    pub fn unbind(&self, token: &str) -> Option<i64> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let removed = sessions.remove(token);
        if let Some(user_id) = removed {
            debug!(user_id, "session unbound");
        }
        removed
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
