//! OAuth2 authorization and callback routes.
//!
//! The CSRF state travels in a short-lived cookie rather than server-side
//! storage; the callback requires the query `state` to match it before any
//! code exchange happens. Every failure on this path lands back on `/login`.

use axum::{
    extract::{Extension, Path, Query},
    http::{
        header::{HeaderValue, InvalidHeaderValue, SET_COOKIE},
        HeaderMap,
    },
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use tracing::{error, info};

use super::{
    providers::{CodeExchanger, Provider},
    resolver::{resolve, Credentials},
    session::establish_session,
    state::AuthConfig,
    types::CallbackQuery,
    utils,
};
use crate::store::Stores;

const STATE_COOKIE_NAME: &str = "confide_oauth_state";
const STATE_COOKIE_TTL_SECONDS: i64 = 600;

/// `GET /auth/:provider`: redirect the browser to the provider's consent
/// screen, pinning the CSRF state in a cookie.
pub async fn authorize(
    Path(slug): Path<String>,
    config: Extension<Arc<AuthConfig>>,
    exchanger: Extension<Arc<dyn CodeExchanger>>,
) -> impl IntoResponse {
    let Some(provider) = Provider::from_slug(&slug) else {
        info!(slug, "Unknown provider");
        return Redirect::to("/login").into_response();
    };
    if !config.provider_enabled(provider) {
        info!(%provider, "Provider not configured");
        return Redirect::to("/login").into_response();
    }

    let state = match utils::generate_token() {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to generate state token: {err}");
            return Redirect::to("/login").into_response();
        }
    };

    let url = match exchanger.authorize_url(provider, &state) {
        Ok(url) => url,
        Err(err) => {
            error!(%provider, "Failed to build authorization URL: {err}");
            return Redirect::to("/login").into_response();
        }
    };

    let Ok(cookie) = state_cookie(&config, &state, STATE_COOKIE_TTL_SECONDS) else {
        return Redirect::to("/login").into_response();
    };
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    (headers, Redirect::to(url.as_str())).into_response()
}

/// `GET /auth/:provider/secrets`: provider callback. On success the session
/// is established and the browser lands on `/secrets`; on any failure it
/// lands on `/login`.
pub async fn callback(
    Path(slug): Path<String>,
    headers: HeaderMap,
    stores: Extension<Stores>,
    config: Extension<Arc<AuthConfig>>,
    exchanger: Extension<Arc<dyn CodeExchanger>>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let Some(provider) = Provider::from_slug(&slug) else {
        info!(slug, "Unknown provider on callback");
        return Redirect::to("/login").into_response();
    };

    if let Some(error) = query.error {
        info!(%provider, error, "Provider returned an error");
        return Redirect::to("/login").into_response();
    }
    let (Some(code), Some(state)) = (query.code, query.state) else {
        info!(%provider, "Callback missing code or state");
        return Redirect::to("/login").into_response();
    };

    // The state cookie must exist and match before the code is worth anything.
    match utils::cookie_value(&headers, STATE_COOKIE_NAME) {
        Some(expected) if expected == state => {}
        _ => {
            info!(%provider, "State mismatch on callback");
            return Redirect::to("/login").into_response();
        }
    }

    let user = match resolve(
        Credentials::OAuth { provider, code },
        stores.users.as_ref(),
        exchanger.as_ref(),
    )
    .await
    {
        Ok(user) => user,
        Err(err) => {
            error!(%provider, "OAuth authentication failed: {err}");
            return Redirect::to("/login").into_response();
        }
    };

    let session_cookie = match establish_session(stores.sessions.as_ref(), &config, &user).await {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to establish session: {err}");
            return Redirect::to("/login").into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    response_headers.append(SET_COOKIE, session_cookie);
    if let Ok(clearing) = state_cookie(&config, "", 0) {
        response_headers.append(SET_COOKIE, clearing);
    }
    (response_headers, Redirect::to("/secrets")).into_response()
}

fn state_cookie(
    config: &AuthConfig,
    state: &str,
    max_age: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{STATE_COOKIE_NAME}={state}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
