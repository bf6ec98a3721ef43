//! Persistence seams for user records and sessions.
//!
//! The gateway talks to two external collaborators: a credential store
//! holding canonical [`User`] records, and a session store holding the
//! minimal `{id, username}` payload behind an opaque cookie token. Both are
//! expressed as traits so the HTTP layer and the authentication core can be
//! exercised against [`MemoryStore`] in tests while production runs on
//! [`PgStore`].

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write collided with the unique constraint on `username`.
    #[error("unique constraint violated")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Canonical identity record.
///
/// `password_hash` is present only for local accounts; OAuth accounts carry
/// the provider profile id in `username` and usually a `display_name`.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub secret: Option<String>,
}

/// Fields required to create a [`User`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
}

/// The entire session payload: a projection of [`User`] down to the two
/// fields needed to authenticate subsequent requests. Deliberately excludes
/// `secret` and credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: Uuid,
    pub username: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Conflict`] when the
    /// username is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Overwrite the user's secret wholesale. Returns `false` when the user
    /// row no longer exists.
    async fn set_secret(&self, id: Uuid, secret: &str) -> Result<bool, StoreError>;

    /// All users that have submitted a secret, for the board.
    async fn users_with_secrets(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a session under the hash of its cookie token.
    async fn create(
        &self,
        token_hash: &[u8],
        session: SessionToken,
        ttl_seconds: i64,
    ) -> Result<(), StoreError>;

    /// Look up a live session. Expired sessions are never returned.
    async fn find(&self, token_hash: &[u8]) -> Result<Option<SessionToken>, StoreError>;

    /// Delete a session. Succeeds when no such session exists.
    async fn delete(&self, token_hash: &[u8]) -> Result<(), StoreError>;
}

/// Handles to both stores, cloned into the router as one extension.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Stores {
    #[must_use]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            sessions: store,
        }
    }

    #[must_use]
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            sessions: store,
        }
    }
}
