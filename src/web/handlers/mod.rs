//! Request handlers for the gateway pages.

pub mod auth;

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect},
    Form,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::store::Stores;
use crate::web::pages;
use crate::GIT_COMMIT_HASH;
use auth::{
    providers::Provider, session::authenticate_session, session::destroy_session,
    state::AuthConfig, types::SubmitForm,
};

/// `GET /`
pub async fn home() -> Html<String> {
    Html(pages::home_page())
}

/// `GET /login`: the form links only to configured providers.
pub async fn login_page(config: Extension<Arc<AuthConfig>>) -> Html<String> {
    Html(pages::login_page(
        config.provider_enabled(Provider::Google),
        config.provider_enabled(Provider::Facebook),
    ))
}

/// `GET /register`
pub async fn register_page(config: Extension<Arc<AuthConfig>>) -> Html<String> {
    Html(pages::register_page(
        config.provider_enabled(Provider::Google),
        config.provider_enabled(Provider::Facebook),
    ))
}

/// `GET /secrets`: the board. Public, like the original: reading secrets
/// requires no account, only writing them does.
pub async fn secrets(stores: Extension<Stores>) -> impl IntoResponse {
    match stores.users.users_with_secrets().await {
        Ok(users) => Html(pages::secrets_page(&users)).into_response(),
        Err(err) => {
            error!("Failed to list secrets: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /submit`: render the form for authenticated users, bounce everyone
/// else to the login page.
pub async fn submit_page(headers: HeaderMap, stores: Extension<Stores>) -> impl IntoResponse {
    match authenticate_session(&headers, stores.sessions.as_ref()).await {
        Ok(Some(session)) => Html(pages::submit_page(&session.username)).into_response(),
        Ok(None) => Redirect::to("/login").into_response(),
        Err(err) => {
            error!("Failed to resolve session: {err}");
            Redirect::to("/login").into_response()
        }
    }
}

/// `POST /submit`: overwrite the authenticated user's secret wholesale.
///
/// A session pointing at a vanished user row is logged and swallowed; the
/// client is redirected to the board either way.
pub async fn submit(
    headers: HeaderMap,
    stores: Extension<Stores>,
    payload: Option<Form<SubmitForm>>,
) -> impl IntoResponse {
    let session = match authenticate_session(&headers, stores.sessions.as_ref()).await {
        Ok(Some(session)) => session,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(err) => {
            error!("Failed to resolve session: {err}");
            return Redirect::to("/login").into_response();
        }
    };

    let secret = payload.map(|Form(form)| form.secret).unwrap_or_default();

    match stores.users.set_secret(session.user_id, &secret).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(
                user_id = %session.user_id,
                "Secret submitted for a user that no longer exists"
            );
        }
        Err(err) => {
            error!("Failed to store secret: {err}");
        }
    }

    Redirect::to("/secrets").into_response()
}

/// `GET /logout`: destroy the session, then redirect home. The redirect is
/// only sent once the store delete has completed, so the cookie cannot
/// outlive a visible logout.
pub async fn logout(
    headers: HeaderMap,
    stores: Extension<Stores>,
    config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    match destroy_session(&headers, stores.sessions.as_ref(), &config).await {
        Ok(clearing) => {
            let mut response_headers = HeaderMap::new();
            response_headers.insert(SET_COOKIE, clearing);
            (response_headers, Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!("Logout failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }));

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
    .parse()
    {
        headers.insert("X-App", value);
    }

    (headers, body)
}
