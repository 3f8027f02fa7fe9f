use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse},
        extractors::MaybeSession,
        password::{hash_password, verify_password},
        repo_types::User,
        session::SESSION_COOKIE,
    },
    error::{AppError, AppResult, MessageBody},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<MessageBody>)> {
    let (email, password) = payload.normalised();

    if email.is_empty() || password.is_empty() {
        warn!("registration without email or password");
        return Err(AppError::Validation(
            "Email and Password are required!".into(),
        ));
    }

    let hash = hash_password(&password)?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }
    // single autocommit insert: the unique constraint settles any race with
    // the check above, and a locked database waits out the busy timeout
    let user = match User::create(&state.db, &email, &hash).await {
        Ok(u) => u,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(%email, "email registered concurrently");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageBody {
            message: "User created! Please login.".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<(HeaderMap, Json<LoginResponse>)> {
    let (email, password) = payload.normalised();

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.sessions.issue(user.id);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&token, state.config.cookie_secure)?,
    );

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful",
            user_id: user.id,
            token,
        }),
    ))
}

#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: MaybeSession,
) -> AppResult<(HeaderMap, Json<MessageBody>)> {
    if let Some(token) = session.token.as_deref() {
        if let Some(user_id) = state.sessions.unbind(token) {
            info!(user_id, "user logged out");
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        expired_cookie(state.config.cookie_secure)?,
    );
    Ok((
        headers,
        Json(MessageBody {
            message: "Logged out".into(),
        }),
    ))
}

fn session_cookie(token: &str, secure: bool) -> AppResult<HeaderValue> {
    build_cookie(token, None, secure)
}

/// Same attributes as the session cookie so the browser replaces it.
fn expired_cookie(secure: bool) -> AppResult<HeaderValue> {
    build_cookie("", Some(0), secure)
}

fn build_cookie(value: &str, max_age: Option<u64>, secure: bool) -> AppResult<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, value);
    if let Some(secs) = max_age {
        cookie.push_str(&format!("; Max-Age={}", secs));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_flags() {
        let plain = session_cookie("abc", false).unwrap();
        assert_eq!(
            plain.to_str().unwrap(),
            "bubbles_session=abc; Path=/; HttpOnly; SameSite=Lax"
        );
        let secure = session_cookie("abc", true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn expired_cookie_targets_session_cookie() {
        let v = expired_cookie(false).unwrap();
        assert_eq!(
            v.to_str().unwrap(),
            "bubbles_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn expired_cookie_keeps_secure_flag() {
        let set = session_cookie("abc", true).unwrap();
        let cleared = expired_cookie(true).unwrap();
        assert!(set.to_str().unwrap().ends_with("; Secure"));
        assert!(cleared.to_str().unwrap().ends_with("; Max-Age=0; Secure"));
        assert!(!expired_cookie(false).unwrap().to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn missing_fields_normalise_to_empty() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"email":"  A@X.com "}"#).unwrap();
        assert_eq!(req.normalised(), ("a@x.com".to_string(), String::new()));
    }
}
