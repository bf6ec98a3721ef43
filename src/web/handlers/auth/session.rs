//! Session manager: cookie-referenced, server-side-backed sessions.
//!
//! On login the user is projected down to `{id, username}` and stored under
//! the SHA-256 hash of a fresh opaque token; the raw token only ever lives
//! in the cookie. On later requests the stored payload is trusted verbatim
//! for the session's lifetime: there is no re-query of the user record, so
//! out-of-band renames or deletions keep authenticating under the stale
//! identity until expiry. That trust window equals the session TTL.

use axum::http::{
    header::{HeaderValue, InvalidHeaderValue},
    HeaderMap,
};
use tracing::error;

use super::{state::AuthConfig, utils, AuthError};
use crate::store::{SessionStore, SessionToken, User};

pub const SESSION_COOKIE_NAME: &str = "confide_session";

/// Create a session for an authenticated user and return the `Set-Cookie`
/// value carrying the raw token.
pub async fn establish_session(
    sessions: &dyn SessionStore,
    config: &AuthConfig,
    user: &User,
) -> Result<HeaderValue, AuthError> {
    let token = utils::generate_token().map_err(AuthError::Internal)?;
    let session = SessionToken {
        user_id: user.id,
        username: user.username.clone(),
    };

    sessions
        .create(
            &utils::hash_token(&token),
            session,
            config.session_ttl_seconds(),
        )
        .await?;

    session_cookie(config, &token).map_err(|err| AuthError::Internal(err.into()))
}

/// Resolve the session cookie into the stored `{id, username}` payload.
///
/// Returns `Ok(None)` when the cookie is missing or references no live
/// session; the payload is not cross-checked against the user store.
pub async fn authenticate_session(
    headers: &HeaderMap,
    sessions: &dyn SessionStore,
) -> Result<Option<SessionToken>, AuthError> {
    let Some(token) = utils::cookie_value(headers, SESSION_COOKIE_NAME) else {
        return Ok(None);
    };
    Ok(sessions.find(&utils::hash_token(&token)).await?)
}

/// Destroy the session referenced by the request, if any, and return the
/// cookie-clearing `Set-Cookie` value. The store delete completes before
/// this returns, so callers redirect only after the session is gone; a
/// missing session is not an error.
pub async fn destroy_session(
    headers: &HeaderMap,
    sessions: &dyn SessionStore,
    config: &AuthConfig,
) -> Result<HeaderValue, AuthError> {
    if let Some(token) = utils::cookie_value(headers, SESSION_COOKIE_NAME) {
        if let Err(err) = sessions.delete(&utils::hash_token(&token)).await {
            error!("Failed to delete session: {err}");
            return Err(err.into());
        }
    }

    clear_session_cookie(config).map_err(|err| AuthError::Internal(err.into()))
}

fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewUser, UserStore};
    use axum::http::header::COOKIE;

    fn config() -> AuthConfig {
        AuthConfig::new("http://localhost:3000".to_string())
    }

    async fn some_user(store: &MemoryStore) -> User {
        store
            .insert(NewUser {
                username: "alice".to_string(),
                password_hash: None,
                display_name: None,
            })
            .await
            .unwrap()
    }

    fn headers_with_cookie(set_cookie: &HeaderValue) -> HeaderMap {
        let cookie_pair = set_cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&cookie_pair).unwrap());
        headers
    }

    #[tokio::test]
    async fn establish_then_authenticate_round_trips() {
        let store = MemoryStore::new();
        let user = some_user(&store).await;

        let set_cookie = establish_session(&store, &config(), &user).await.unwrap();
        let cookie = set_cookie.to_str().unwrap();
        assert!(cookie.starts_with("confide_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let headers = headers_with_cookie(&set_cookie);
        let session = authenticate_session(&headers, &store).await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.username, "alice");
    }

    #[tokio::test]
    async fn secure_flag_follows_config() {
        let store = MemoryStore::new();
        let user = some_user(&store).await;
        let config = config().with_secure_cookies(true);

        let set_cookie = establish_session(&store, &config, &user).await.unwrap();
        assert!(set_cookie.to_str().unwrap().contains("; Secure"));
    }

    #[tokio::test]
    async fn missing_cookie_is_anonymous() {
        let store = MemoryStore::new();
        let session = authenticate_session(&HeaderMap::new(), &store).await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn destroy_removes_the_session_and_clears_the_cookie() {
        let store = MemoryStore::new();
        let user = some_user(&store).await;
        let config = config();

        let set_cookie = establish_session(&store, &config, &user).await.unwrap();
        let headers = headers_with_cookie(&set_cookie);

        let clearing = destroy_session(&headers, &store, &config).await.unwrap();
        assert!(clearing.to_str().unwrap().contains("Max-Age=0"));

        let session = authenticate_session(&headers, &store).await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn destroy_without_a_session_still_succeeds() {
        let store = MemoryStore::new();
        let clearing = destroy_session(&HeaderMap::new(), &store, &config())
            .await
            .unwrap();
        assert!(clearing.to_str().unwrap().contains("Max-Age=0"));
    }
}
