//! Local username/password routes.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Form,
};
use std::sync::Arc;
use tracing::{error, info};

use super::{password, session::establish_session, state::AuthConfig, types, utils, AuthError};
use crate::store::Stores;

/// `POST /register`: create a local account and sign it in.
///
/// A taken username bounces back to the registration form; the new session
/// is established before the redirect so `/secrets` renders authenticated.
pub async fn register(
    stores: Extension<Stores>,
    config: Extension<Arc<AuthConfig>>,
    payload: Option<Form<types::RegisterForm>>,
) -> impl IntoResponse {
    let Some(Form(form)) = payload else {
        return Redirect::to("/register").into_response();
    };

    let username = form.username.trim();
    if !utils::valid_username(username) || form.password.is_empty() {
        info!("Rejected registration for malformed username or empty password");
        return Redirect::to("/register").into_response();
    }

    let user = match password::register(stores.users.as_ref(), username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::Conflict) => {
            info!(username, "Registration conflict");
            return Redirect::to("/register").into_response();
        }
        Err(err) => {
            error!("Registration failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Register-then-login is two steps; a crash between them leaves a valid
    // account without a session, which the user repairs by logging in.
    match establish_session(stores.sessions.as_ref(), &config, &user).await {
        Ok(cookie) => {
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (headers, Redirect::to("/secrets")).into_response()
        }
        Err(err) => {
            error!("Failed to establish session after registration: {err}");
            Redirect::to("/login").into_response()
        }
    }
}

/// `POST /login`: authenticate a local account.
///
/// Failures are logged and fall through to the login form with no
/// user-facing error detail, and without revealing whether the username
/// exists.
pub async fn login(
    stores: Extension<Stores>,
    config: Extension<Arc<AuthConfig>>,
    payload: Option<Form<types::LoginForm>>,
) -> impl IntoResponse {
    let Some(Form(form)) = payload else {
        return Redirect::to("/login").into_response();
    };

    let user = match password::authenticate(
        stores.users.as_ref(),
        form.username.trim(),
        &form.password,
    )
    .await
    {
        Ok(user) => user,
        Err(AuthError::Unauthorized) => {
            info!("Login failed");
            return Redirect::to("/login").into_response();
        }
        Err(err) => {
            error!("Login failed: {err}");
            return Redirect::to("/login").into_response();
        }
    };

    match establish_session(stores.sessions.as_ref(), &config, &user).await {
        Ok(cookie) => {
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (headers, Redirect::to("/secrets")).into_response()
        }
        Err(err) => {
            error!("Failed to establish session: {err}");
            Redirect::to("/login").into_response()
        }
    }
}
