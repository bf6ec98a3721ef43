//! Authentication core: strategies, identity resolution, and sessions.
//!
//! Three strategies (local password, Google, Facebook) funnel through one
//! seam, [`resolver::resolve`], so the session layer never learns which
//! strategy produced an identity.

use thiserror::Error;

use crate::store::StoreError;

pub mod local;
pub mod oauth;
pub mod password;
pub mod providers;
pub mod resolver;
pub mod session;
pub mod state;
pub mod types;
pub mod utils;

/// Error taxonomy for the authentication core. Routes convert these into
/// redirects; nothing here leaks to the client as a raw error page except
/// unexpected store failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Duplicate username on registration.
    #[error("username already taken")]
    Conflict,
    /// Bad credentials. Unknown username and wrong password both map here,
    /// indistinguishably, so callers cannot enumerate accounts.
    #[error("invalid credentials")]
    Unauthorized,
    /// OAuth code exchange or profile resolution failed.
    #[error("provider authentication failed: {0}")]
    AuthFailure(String),
    /// A session referenced a user that no longer resolves.
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}
